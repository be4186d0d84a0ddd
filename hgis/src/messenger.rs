/// Messenger is used to notify the application that the map canvas should be redrawn on the
/// screen.
pub trait Messenger: Send + Sync {
    /// Requests a redraw of the canvas.
    fn request_redraw(&self);
}

impl<T: Fn() + Send + Sync> Messenger for T {
    fn request_redraw(&self) {
        self()
    }
}
