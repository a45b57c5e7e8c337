use crate::math::Point2;

/// Phase of a mouse or pen pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerPhase {
    Down,
    Move,
    Up,
}

/// Raw input from the host, in client-space pixels.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    Pointer { phase: PointerPhase, position: Point2 },
    TouchStart { touches: Vec<Point2> },
    TouchMove { touches: Vec<Point2> },
    TouchEnd,
}

/// Device-independent stroke input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StrokeInput {
    Begin(Point2),
    Extend(Point2),
    End,
}

impl InputEvent {
    /// Maps pointer and touch events onto one stroke stream. Touches follow
    /// the first finger; a touch event without touches is ignored.
    #[must_use]
    pub fn normalize(&self) -> Option<StrokeInput> {
        match self {
            Self::Pointer { phase, position } => Some(match phase {
                PointerPhase::Down => StrokeInput::Begin(*position),
                PointerPhase::Move => StrokeInput::Extend(*position),
                PointerPhase::Up => StrokeInput::End,
            }),
            Self::TouchStart { touches } => touches.first().map(|p| StrokeInput::Begin(*p)),
            Self::TouchMove { touches } => touches.first().map(|p| StrokeInput::Extend(*p)),
            Self::TouchEnd => Some(StrokeInput::End),
        }
    }
}
