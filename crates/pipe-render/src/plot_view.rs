// Directional deformation along the pipe via egui_plot.

use egui_plot::{Legend, Line, Plot};
use pipe_core::angular::Sector;
use pipe_core::Synthesis;

const SECTORS: [Sector; 4] = [Sector::Upper, Sector::Right, Sector::Circular, Sector::Left];

/// `[z, deformation]` for every ring of the synthesized mesh.
pub fn profile_points(synthesis: &Synthesis, length: f64, sector: Sector) -> Vec<[f64; 2]> {
    synthesis
        .stations
        .iter()
        .zip(&synthesis.profiles)
        .map(|(&p, profile)| [p * length, profile.deformation(sector)])
        .collect()
}

/// Draw the deformation profile in a bottom panel.
pub fn draw_profile_plot(ctx: &egui::Context, synthesis: Option<&Synthesis>, length: f64) {
    egui::TopBottomPanel::bottom("profile")
        .resizable(true)
        .min_height(180.0)
        .show(ctx, |ui| {
            ui.heading("Deformation Profile");

            let Some(synthesis) = synthesis else {
                return;
            };

            Plot::new("profile_plot")
                .x_axis_label("Position along pipe (m)")
                .y_axis_label("Deformation")
                .legend(Legend::default())
                .show(ui, |plot_ui| {
                    for sector in SECTORS {
                        let points = profile_points(synthesis, length, sector);
                        plot_ui.line(Line::new(points).name(sector.location().label()));
                    }
                });
        });
}
