use crate::slides::{Photo, Slide};

/// Inputs from the rendering surface and the page.
#[derive(Debug)]
pub enum ControlEvent {
    /// Fresh photo list from the source; triggers an immediate build.
    SetPhotos(Vec<Photo>),
    NextPressed,
    PrevPressed,
    PointerDown { x: f32 },
    PointerMove { x: f32 },
    PointerUp { x: f32 },
    /// A link inside the track was activated.
    Clicked { url: String },
    /// Viewport/orientation change; triggers a debounced rebuild.
    Resized { width: f32 },
}

/// Instructions for the rendering surface. A `Build` replaces the rendered
/// track; when `looping` the surface appends one clone of the first slide
/// and prepends one clone of the last, so `Translate` offsets index the
/// augmented sequence. An unanimated `Translate` must disable the visual
/// transition, apply the transform, flush layout, then re-enable it.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderCommand {
    Build { slides: Vec<Slide>, looping: bool },
    Clear,
    Translate { offset_percent: f32, animate: bool },
    Navigate { url: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Priority {
    Eager,
    Background,
}

/// Preloader instructions.
#[derive(Debug, Clone, PartialEq)]
pub enum PreloadCommand {
    /// Forget every loaded marker; a new render pass started.
    Reset,
    Fetch { urls: Vec<String>, priority: Priority },
}

/// A resource finished loading and decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceLoaded(pub String);
