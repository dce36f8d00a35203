pub mod app;
pub mod mesh_view;
pub mod plot_view;
pub mod renderer;
pub mod ui;

pub use app::{App, ViewerInput};
pub use renderer::RenderError;

use tracing::info;
use winit::error::EventLoopError;
use winit::event_loop::{ControlFlow, EventLoop};

/// Open the viewer window and block until it is closed.
pub fn run(input: ViewerInput) -> Result<(), EventLoopError> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Wait);

    info!(
        "Opening viewer: {} readings, {:?} colouring",
        input.readings.len(),
        input.mode
    );
    let mut app = App::new(input);
    event_loop.run_app(&mut app)
}
