//! Error types for renderer setup and the windowed demo.
//!
//! The effect itself is infallible once built; failures cluster around GPU
//! presentation setup and window creation, so that is what these types
//! cover.

use std::fmt;

/// Errors that can occur while setting up GPU presentation.
#[derive(Debug)]
pub enum GfxError {
    /// Failed to create a surface for rendering.
    SurfaceCreation(wgpu::CreateSurfaceError),
    /// No compatible GPU adapter found.
    Adapter(wgpu::RequestAdapterError),
    /// Failed to create GPU device.
    DeviceCreation(wgpu::RequestDeviceError),
}

impl fmt::Display for GfxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GfxError::SurfaceCreation(e) => write!(f, "Failed to create GPU surface: {}", e),
            GfxError::Adapter(e) => write!(
                f,
                "No compatible GPU adapter found ({}). Ensure your system has a GPU with WebGPU/Vulkan/Metal/DX12 support.",
                e
            ),
            GfxError::DeviceCreation(e) => write!(f, "Failed to create GPU device: {}", e),
        }
    }
}

impl std::error::Error for GfxError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GfxError::SurfaceCreation(e) => Some(e),
            GfxError::Adapter(e) => Some(e),
            GfxError::DeviceCreation(e) => Some(e),
        }
    }
}

impl From<wgpu::CreateSurfaceError> for GfxError {
    fn from(e: wgpu::CreateSurfaceError) -> Self {
        GfxError::SurfaceCreation(e)
    }
}

impl From<wgpu::RequestAdapterError> for GfxError {
    fn from(e: wgpu::RequestAdapterError) -> Self {
        GfxError::Adapter(e)
    }
}

impl From<wgpu::RequestDeviceError> for GfxError {
    fn from(e: wgpu::RequestDeviceError) -> Self {
        GfxError::DeviceCreation(e)
    }
}

/// Errors that can occur when running the windowed demo.
#[derive(Debug)]
pub enum RunError {
    /// Failed to create the event loop.
    EventLoop(winit::error::EventLoopError),
    /// Failed to create the window.
    Window(winit::error::OsError),
    /// GPU presentation setup failed.
    Gfx(GfxError),
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunError::EventLoop(e) => write!(f, "Failed to create event loop: {}", e),
            RunError::Window(e) => write!(f, "Failed to create window: {}", e),
            RunError::Gfx(e) => write!(f, "GPU error: {}", e),
        }
    }
}

impl std::error::Error for RunError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RunError::EventLoop(e) => Some(e),
            RunError::Window(e) => Some(e),
            RunError::Gfx(e) => Some(e),
        }
    }
}

impl From<winit::error::EventLoopError> for RunError {
    fn from(e: winit::error::EventLoopError) -> Self {
        RunError::EventLoop(e)
    }
}

impl From<winit::error::OsError> for RunError {
    fn from(e: winit::error::OsError) -> Self {
        RunError::Window(e)
    }
}

impl From<GfxError> for RunError {
    fn from(e: GfxError) -> Self {
        RunError::Gfx(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_loop_error_converts_and_displays() {
        let err: RunError = winit::error::EventLoopError::RecreationAttempt.into();
        assert!(matches!(err, RunError::EventLoop(_)));
        assert!(err.to_string().contains("event loop"));
    }

    #[test]
    fn test_event_loop_error_keeps_source() {
        use std::error::Error;
        let err: RunError = winit::error::EventLoopError::ExitFailure(1).into();
        assert!(err.source().is_some());
    }
}
