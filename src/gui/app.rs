//! Main application window

use eframe::egui::{self, Color32, RichText, Ui};
use egui_extras::{Column, TableBuilder};
use satscan::config::Config;
use satscan::detector::YoloDetector;
use satscan::error::Result;
use satscan::export::write_csv;
use satscan::pipeline::run_image;
use satscan::scanner::scan_directory;
use satscan::types::DetectionRun;
use std::path::{Path, PathBuf};

/// Main application state
pub struct SatScanApp {
    /// Application configuration
    config: Config,
    /// Loaded detector, None until a model is available
    detector: Option<YoloDetector>,
    /// Images opened via file or folder dialog
    image_list: Vec<PathBuf>,
    /// Index of the image currently shown
    current_index: usize,
    /// Runs of the most recent detection batch
    runs: Vec<DetectionRun>,
    /// Scrolling log buffer
    log: String,
    /// About window visibility
    show_about: bool,
}

impl SatScanApp {
    /// Create a new application instance
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        egui_extras::install_image_loaders(&cc.egui_ctx);
        cc.egui_ctx.set_visuals(egui::Visuals::light());

        let config = Config::load().unwrap_or_default();

        let mut app = Self {
            config,
            detector: None,
            image_list: Vec::new(),
            current_index: 0,
            runs: Vec::new(),
            log: String::new(),
            show_about: false,
        };
        app.log_line("Loading model...");
        app.load_detector();
        app
    }

    fn log_line(&mut self, msg: &str) {
        self.log.push_str(msg);
        self.log.push('\n');
    }

    /// (Re)build the detector from the current configuration.
    fn load_detector(&mut self) {
        match YoloDetector::from_config(&self.config) {
            Ok(detector) => {
                self.detector = Some(detector);
                self.log_line("Model loaded.");
            }
            Err(e) => {
                self.detector = None;
                self.log_line(&format!("Model not loaded: {}", e));
            }
        }
    }

    fn current_image(&self) -> Option<&Path> {
        self.image_list.get(self.current_index).map(|p| p.as_path())
    }

    /// Run of the currently shown image, if the last batch covered it.
    fn current_run(&self) -> Option<&DetectionRun> {
        let current = self.current_image()?;
        self.runs.iter().find(|r| r.image_path == current)
    }

    fn open_image(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Image files", &["jpg", "jpeg", "png"])
            .pick_file()
        {
            self.log_line(&format!("Opened image: {}", path.display()));
            self.image_list = vec![path];
            self.current_index = 0;
            self.runs.clear();
        }
    }

    fn open_folder(&mut self) {
        if let Some(folder) = rfd::FileDialog::new().pick_folder() {
            match scan_directory(&folder) {
                Ok(images) => {
                    self.log_line(&format!(
                        "Opened folder: {} ({} images)",
                        folder.display(),
                        images.len()
                    ));
                    self.image_list = images;
                    self.current_index = 0;
                    self.runs.clear();
                }
                Err(e) => self.log_line(&format!("Error: {}", e)),
            }
        }
    }

    fn select_model(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("ONNX model", &["onnx"])
            .pick_file()
        {
            self.config.model_path = Some(path);
            if let Err(e) = self.config.save() {
                self.log_line(&format!("Could not save config: {}", e));
            }
            self.load_detector();
        }
    }

    fn prev_image(&mut self) {
        if !self.image_list.is_empty() && self.current_index > 0 {
            self.current_index -= 1;
        }
    }

    fn next_image(&mut self) {
        if !self.image_list.is_empty() && self.current_index < self.image_list.len() - 1 {
            self.current_index += 1;
        }
    }

    fn reset(&mut self) {
        self.image_list.clear();
        self.current_index = 0;
        self.runs.clear();
        self.log.clear();
        self.log_line("Application reset.");
    }

    /// Run detection over the whole opened list, strictly sequentially.
    ///
    /// The core pipeline is synchronous; the window blocks for the duration
    /// of the batch, like the pipeline's CLI counterpart.
    fn run_detection(&mut self, ctx: &egui::Context) {
        if self.image_list.is_empty() {
            self.log_line("Open an image or folder first.");
            return;
        }
        if self.detector.is_none() {
            self.log_line("No model loaded. Pick one under Settings.");
            return;
        }

        let total = self.image_list.len();
        let images = self.image_list.clone();
        self.runs.clear();

        let result: Result<()> = (|| {
            for (index, image_path) in images.iter().enumerate() {
                self.log_line(&format!(
                    "Detecting {}/{}: {}",
                    index + 1,
                    total,
                    image_path.display()
                ));
                let detector = self.detector.as_ref().ok_or_else(|| {
                    satscan::error::Error::ModelUnavailable("no model loaded".to_string())
                })?;
                let run = run_image(detector, image_path, &self.config)?;
                if let Some(ref annotated) = run.annotated_path {
                    // Annotated output reuses one path per folder; drop the
                    // cached texture so the new file shows up.
                    ctx.forget_image(&format!("file://{}", annotated.display()));
                }
                self.runs.push(run);
            }
            write_csv(&self.config.csv_path(), &self.runs)?;
            Ok(())
        })();

        match result {
            Ok(()) => {
                self.log_line(&format!(
                    "All detections complete. CSV saved: {}",
                    self.config.csv_path().display()
                ));
            }
            Err(e) => self.log_line(&format!("Error: {} (batch aborted)", e)),
        }
    }

    fn render_menu(&mut self, ui: &mut Ui, ctx: &egui::Context) {
        egui::menu::bar(ui, |ui| {
            ui.menu_button("File", |ui| {
                if ui.button("Open Image...").clicked() {
                    self.open_image();
                    ui.close_menu();
                }
                if ui.button("Open Folder...").clicked() {
                    self.open_folder();
                    ui.close_menu();
                }
                ui.separator();
                if ui.button("Quit").clicked() {
                    ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                }
            });
            ui.menu_button("Settings", |ui| {
                if ui.button("Select Model...").clicked() {
                    self.select_model();
                    ui.close_menu();
                }
                ui.horizontal(|ui| {
                    ui.label("Threshold:");
                    let response = ui.add(
                        egui::Slider::new(&mut self.config.confidence_threshold, 0.0..=1.0)
                            .fixed_decimals(2),
                    );
                    if response.drag_stopped() {
                        if let Err(e) = self.config.save() {
                            self.log_line(&format!("Could not save config: {}", e));
                        }
                    }
                });
            });
            ui.menu_button("View", |ui| {
                if ui.button("Light Mode").clicked() {
                    ctx.set_visuals(egui::Visuals::light());
                    ui.close_menu();
                }
                if ui.button("Dark Mode").clicked() {
                    ctx.set_visuals(egui::Visuals::dark());
                    ui.close_menu();
                }
            });
            ui.menu_button("Help", |ui| {
                if ui.button("About").clicked() {
                    self.show_about = true;
                    ui.close_menu();
                }
            });
        });
    }

    fn render_toolbar(&mut self, ui: &mut Ui, ctx: &egui::Context) {
        ui.horizontal(|ui| {
            if ui.button("< Previous").clicked() {
                self.prev_image();
            }
            if ui.button("Next >").clicked() {
                self.next_image();
            }
            ui.add_space(10.0);
            let can_run = !self.image_list.is_empty();
            if ui
                .add_enabled(can_run, egui::Button::new(RichText::new("Run Detection").strong()))
                .clicked()
            {
                self.run_detection(ctx);
            }
            ui.add_space(10.0);
            if ui.button("Reset").clicked() {
                self.reset();
            }

            if !self.image_list.is_empty() {
                ui.add_space(20.0);
                ui.label(format!(
                    "{}/{}",
                    self.current_index + 1,
                    self.image_list.len()
                ));
            }
        });
    }

    fn render_images(&mut self, ui: &mut Ui) {
        let original = self.current_image().map(|p| p.to_path_buf());
        let annotated = self.current_run().and_then(|r| r.annotated_path.clone());

        ui.columns(2, |columns| {
            columns[0].vertical_centered(|ui| {
                ui.label(RichText::new("Original").strong());
                match original {
                    Some(path) => {
                        ui.add(
                            egui::Image::new(format!("file://{}", path.display()))
                                .max_width(ui.available_width())
                                .max_height(ui.available_height() - 20.0),
                        );
                    }
                    None => {
                        ui.add_space(40.0);
                        ui.label(
                            RichText::new("No image opened")
                                .italics()
                                .color(Color32::GRAY),
                        );
                    }
                }
            });
            columns[1].vertical_centered(|ui| {
                ui.label(RichText::new("Detection Result").strong());
                match annotated {
                    Some(path) => {
                        ui.add(
                            egui::Image::new(format!("file://{}", path.display()))
                                .max_width(ui.available_width())
                                .max_height(ui.available_height() - 20.0),
                        );
                    }
                    None => {
                        ui.add_space(40.0);
                        ui.label(
                            RichText::new("No detection yet")
                                .italics()
                                .color(Color32::GRAY),
                        );
                    }
                }
            });
        });
    }

    fn render_results_table(&self, ui: &mut Ui) {
        ui.heading("Detections");
        ui.add_space(4.0);

        let Some(run) = self.current_run() else {
            ui.label(
                RichText::new("Run detection to see results")
                    .italics()
                    .color(Color32::GRAY),
            );
            return;
        };

        TableBuilder::new(ui)
            .striped(true)
            .column(Column::auto().at_least(28.0))
            .column(Column::auto().at_least(70.0))
            .column(Column::auto().at_least(40.0))
            .columns(Column::auto().at_least(36.0), 4)
            .column(Column::remainder().at_least(70.0))
            .header(18.0, |mut header| {
                for title in ["ID", "Class", "Conf", "x1", "y1", "x2", "y2", "P.Alan (m²)"] {
                    header.col(|ui| {
                        ui.strong(title);
                    });
                }
            })
            .body(|mut body| {
                for record in &run.records {
                    let bbox = record.detection.bbox;
                    body.row(16.0, |mut row| {
                        row.col(|ui| {
                            ui.label(record.sequence_id.to_string());
                        });
                        row.col(|ui| {
                            ui.label(&record.detection.class_name);
                        });
                        row.col(|ui| {
                            ui.label(format!("{:.2}", record.detection.confidence));
                        });
                        for value in [bbox.x1, bbox.y1, bbox.x2, bbox.y2] {
                            row.col(|ui| {
                                ui.label(value.to_string());
                            });
                        }
                        row.col(|ui| {
                            ui.label(format!("{:.2}", record.real_area_m2));
                        });
                    });
                }
            });

        ui.add_space(6.0);
        ui.label(format!("Total area: {:.2} m²", run.total_area_m2()));
    }

    fn render_log(&mut self, ui: &mut Ui) {
        egui::ScrollArea::vertical()
            .stick_to_bottom(true)
            .max_height(80.0)
            .show(ui, |ui| {
                ui.add_sized(
                    [ui.available_width(), 70.0],
                    egui::TextEdit::multiline(&mut self.log.as_str())
                        .font(egui::TextStyle::Monospace),
                );
            });
    }

    fn render_about(&mut self, ctx: &egui::Context) {
        let mut open = self.show_about;
        egui::Window::new("About")
            .open(&mut open)
            .resizable(false)
            .show(ctx, |ui| {
                ui.label("SatScan v0.1.0");
                ui.label("Satellite imagery object detection and area reporting.");
            });
        self.show_about = open;
    }
}

impl eframe::App for SatScanApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            self.render_menu(ui, ctx);
            ui.add_space(2.0);
            self.render_toolbar(ui, ctx);
            ui.add_space(2.0);
        });

        egui::TopBottomPanel::bottom("log_panel").show(ctx, |ui| {
            ui.add_space(2.0);
            self.render_log(ui);
            ui.add_space(2.0);
        });

        egui::SidePanel::right("results_panel")
            .default_width(330.0)
            .show(ctx, |ui| {
                self.render_results_table(ui);
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.render_images(ui);
        });

        if self.show_about {
            self.render_about(ctx);
        }
    }
}
