// Errors that can stop the emulator from starting or keep it from drawing.
// Pixel writes never fail; only setting up and feeding the window can.
use std::fmt::{self, Display};
use std::io;

#[derive(Debug)]
pub enum MatrixError {
    InvalidPanel(String),   // Panel or LED size the emulator cannot address
    WindowInit(String),     // Creating the output window failed
    WindowUpdate(String),   // Pushing a frame to the window failed
    ThreadSpawn(io::Error), // The render thread could not be started
    RenderThreadExited,     // The render thread quit before reporting readiness
    Signal(ctrlc::Error),   // Installing the shutdown handler failed
}

impl Display for MatrixError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatrixError::InvalidPanel(s) => write!(f, "Invalid panel configuration: {s}"),
            MatrixError::WindowInit(s) => write!(f, "Window init error: {s}"),
            MatrixError::WindowUpdate(s) => write!(f, "Window update error: {s}"),
            MatrixError::ThreadSpawn(e) => write!(f, "Failed to spawn render thread: {e}"),
            MatrixError::RenderThreadExited => {
                write!(f, "Render thread exited before the window was ready")
            }
            MatrixError::Signal(e) => write!(f, "Failed to install signal handler: {e}"),
        }
    }
}

impl std::error::Error for MatrixError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MatrixError::ThreadSpawn(e) => Some(e),
            MatrixError::Signal(e) => Some(e),
            _ => None,
        }
    }
}
