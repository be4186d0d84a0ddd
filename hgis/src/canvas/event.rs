use hgis_types::{Point2d, Rect};

/// Change notification of the [`MapCanvas`](super::MapCanvas).
#[derive(Debug, Clone, PartialEq)]
pub enum CanvasEvent {
    /// Visible extent changed. Contains the new extent in map coordinates.
    ExtentChanged(Rect),
    /// Scale changed. Contains the new scale in map units per pixel.
    ScaleChanged(f64),
    /// Rotation changed. Contains the new rotation in degrees.
    RotationChanged(f64),
    /// Redraw of the canvas is about to be requested.
    RenderStarting,
    /// Redraw of the canvas was requested.
    RenderComplete,
    /// Pointer moved over the canvas. Contains the map coordinates of the pointer.
    XyCoordinates(Point2d),
}

/// Mouse button.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MouseButton {
    /// Primary button.
    Left,
    /// Wheel button.
    Middle,
    /// Secondary button.
    Right,
    /// Any other button.
    Other,
}

/// Keyboard key handled by the canvas.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Key {
    /// `+`.
    Plus,
    /// `=`.
    Equals,
    /// `-`.
    Minus,
    /// Space bar.
    Space,
    /// Letter or other printable character.
    Char(char),
}

/// State of modifier keys at the moment of a key press.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct Modifiers {
    /// Control key is pressed.
    pub ctrl: bool,
    /// Shift key is pressed.
    pub shift: bool,
    /// Alt key is pressed.
    pub alt: bool,
}

impl Modifiers {
    /// Only the control key pressed.
    pub const CTRL: Self = Self {
        ctrl: true,
        shift: false,
        alt: false,
    };
}

/// User input given to the canvas by the host window.
///
/// All positions are in device pixels from the top-left corner of the canvas.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// A mouse button was pressed.
    ButtonPressed(MouseButton, Point2d),
    /// A mouse button was released.
    ButtonReleased(MouseButton, Point2d),
    /// Pointer moved.
    PointerMoved(Point2d),
    /// Mouse wheel was scrolled. Positive delta means scrolling away from the user (zoom in).
    Scroll(f64, Point2d),
    /// A mouse button was double clicked.
    DoubleClick(MouseButton, Point2d),
    /// A key was pressed.
    KeyPressed(Key, Modifiers),
}

/// Pointer interaction state of the canvas.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub enum InteractionState {
    /// No interaction in progress.
    #[default]
    Idle,
    /// The map is being dragged.
    Panning {
        /// Pointer position of the previous drag step in device pixels.
        last_position: Point2d,
    },
}
