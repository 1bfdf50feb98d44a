//! Geometry Provider
//!
//! Phases 3, 4 and 7 depend on where things actually are on screen. Instead of
//! caching positions, the actor asks a [`GeometryProvider`] at the moment a
//! phase starts. Layout can change between runs (rotation, dynamic type), so
//! nothing measured here is kept beyond the phase that asked for it.
//!
//! All horizontal positions are relative to the button centre.

use crate::animation::Element;
use crate::config::{CopyConfig, LayoutConfig};

/// Synchronous access to current layout
pub trait GeometryProvider {
    /// Run a layout pass if one is pending
    ///
    /// Measured bounds are zero until this has run at least once after the
    /// last invalidation.
    fn layout_if_needed(&mut self);

    /// Laid-out width of an element (0.0 if layout is pending)
    fn bounds_width(&self, element: Element) -> f32;

    /// Natural width of an element's content (always available)
    fn intrinsic_width(&self, element: Element) -> f32;

    /// Untransformed centre of an element (0.0 if layout is pending)
    fn layout_center_x(&self, element: Element) -> f32;

    /// Current button width
    fn button_width(&self) -> f32;
}

/// Text-metrics layout of the button's contents
///
/// Labels hug their content and sit centred in the button. "Order placed" and
/// its checkmark share a centred container; the chevron hangs off the trailing
/// edge of "Continue Shopping".
#[derive(Clone, Debug)]
pub struct TextLayout {
    metrics: LayoutConfig,
    copy: CopyConfig,
    laid_out: bool,
}

impl TextLayout {
    /// Create a layout that has not been laid out yet
    #[must_use]
    pub fn new(metrics: LayoutConfig, copy: CopyConfig) -> Self {
        Self {
            metrics,
            copy,
            laid_out: false,
        }
    }

    /// Change the button width; the next measurement needs a new layout pass
    pub fn set_button_width(&mut self, width: f32) {
        self.metrics.button_width = width;
        self.invalidate();
    }

    /// Mark layout dirty
    pub fn invalidate(&mut self) {
        self.laid_out = false;
    }

    /// Whether a layout pass has run since the last invalidation
    #[must_use]
    pub fn is_laid_out(&self) -> bool {
        self.laid_out
    }

    #[allow(clippy::cast_precision_loss)]
    fn text_width(&self, text: &str) -> f32 {
        text.chars().count() as f32 * self.metrics.glyph_advance
    }

    fn container_width(&self) -> f32 {
        self.text_width(&self.copy.order_placed)
            + self.metrics.checkmark_spacing
            + self.metrics.checkmark_size
    }
}

impl GeometryProvider for TextLayout {
    fn layout_if_needed(&mut self) {
        if !self.laid_out {
            tracing::trace!(button_width = self.metrics.button_width, "Layout pass");
            self.laid_out = true;
        }
    }

    fn bounds_width(&self, element: Element) -> f32 {
        if self.laid_out {
            self.intrinsic_width(element)
        } else {
            0.0
        }
    }

    fn intrinsic_width(&self, element: Element) -> f32 {
        match element {
            Element::Surface => self.metrics.button_width,
            Element::PlaceOrderLabel => self.text_width(&self.copy.place_order),
            Element::OrderPlacedLabel | Element::TextMask => {
                self.text_width(&self.copy.order_placed)
            }
            Element::OrderPlacedContainer => self.container_width(),
            Element::ButtonCheckmark => self.metrics.checkmark_size,
            Element::FloatingCheckmark => self.metrics.floating_checkmark_size,
            Element::ContinueLabel => self.text_width(&self.copy.continue_shopping),
            Element::Chevron => self.metrics.chevron_width,
            Element::SuccessPanel | Element::SubtotalLabel | Element::PriceLabel => 0.0,
        }
    }

    fn layout_center_x(&self, element: Element) -> f32 {
        if !self.laid_out {
            return 0.0;
        }
        let half_container = self.container_width() / 2.0;
        match element {
            Element::OrderPlacedLabel | Element::TextMask => {
                -half_container + self.text_width(&self.copy.order_placed) / 2.0
            }
            Element::ButtonCheckmark => half_container - self.metrics.checkmark_size / 2.0,
            Element::Chevron => {
                (self.text_width(&self.copy.continue_shopping) + self.metrics.chevron_width) / 2.0
            }
            _ => 0.0,
        }
    }

    fn button_width(&self) -> f32 {
        self.metrics.button_width
    }
}

/// Horizontal displacement of the checkmark from the button centre
///
/// Taken at the start of phase 4, after the phase 3 container shift, and used
/// as the floating checkmark's starting point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CheckmarkOffset {
    /// Displacement in points (negative = left of centre)
    pub x: f32,
}

impl CheckmarkOffset {
    /// Measure from current layout plus the container's current translation
    pub fn measure<G: GeometryProvider + ?Sized>(geometry: &mut G, container_shift: f32) -> Self {
        geometry.layout_if_needed();
        Self {
            x: geometry.layout_center_x(Element::ButtonCheckmark) + container_shift,
        }
    }
}
