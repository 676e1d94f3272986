//! Hit-testing and geometry over drawable objects.
//!
//! Every object is transformed local → scene as: scale about the header
//! origin, then rotate about the center of the scaled bounds. Hit tests run
//! the inverse transform and test the variant's exact geometry, widened by
//! half the stroke plus a screen-space slop.

#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::camera::{Camera, Point, Rect};
use crate::consts::{HANDLE_RADIUS_PX, MIN_RESIZE_EXTENT};
use crate::doc::{DrawableObject, ObjectId, ObjectPatch, Scene, Shape};

/// Which part of an object was hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitPart {
    Body,
    ResizeHandle(ResizeAnchor),
}

/// Anchor position for resize handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeAnchor {
    N,
    Ne,
    E,
    Se,
    S,
    Sw,
    W,
    Nw,
}

impl ResizeAnchor {
    pub const ALL: [ResizeAnchor; 8] = [Self::N, Self::Ne, Self::E, Self::Se, Self::S, Self::Sw, Self::W, Self::Nw];

    /// Horizontal edge moved by this handle: -1 west, +1 east, 0 none.
    fn x_sign(self) -> i8 {
        match self {
            Self::Ne | Self::E | Self::Se => 1,
            Self::Nw | Self::W | Self::Sw => -1,
            Self::N | Self::S => 0,
        }
    }

    /// Vertical edge moved by this handle: -1 north, +1 south, 0 none.
    fn y_sign(self) -> i8 {
        match self {
            Self::Sw | Self::S | Self::Se => 1,
            Self::Nw | Self::N | Self::Ne => -1,
            Self::E | Self::W => 0,
        }
    }

    /// Handle position on a bounding box.
    #[must_use]
    pub fn position(self, bounds: &Rect) -> Point {
        let c = bounds.center();
        let x = match self.x_sign() {
            1 => bounds.max.x,
            -1 => bounds.min.x,
            _ => c.x,
        };
        let y = match self.y_sign() {
            1 => bounds.max.y,
            -1 => bounds.min.y,
            _ => c.y,
        };
        Point::new(x, y)
    }
}

/// Result of a hit test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit {
    pub object_id: ObjectId,
    pub part: HitPart,
}

// =============================================================
// Transforms
// =============================================================

/// Rotation pivot: center of the scaled local bounds, in scene space.
#[must_use]
pub fn pivot(obj: &DrawableObject) -> Point {
    let c = obj.shape.local_bounds().center();
    let h = &obj.header;
    Point::new(h.x + c.x * h.scale_x, h.y + c.y * h.scale_y)
}

/// Map a local point into scene space.
#[must_use]
pub fn local_to_scene(obj: &DrawableObject, local: Point) -> Point {
    let h = &obj.header;
    Point::new(h.x + local.x * h.scale_x, h.y + local.y * h.scale_y).rotate_around(pivot(obj), h.rotation)
}

/// Map a scene point into the object's local space.
#[must_use]
pub fn scene_to_local(obj: &DrawableObject, scene: Point) -> Point {
    let h = &obj.header;
    let p = scene.rotate_around(pivot(obj), -h.rotation);
    Point::new((p.x - h.x) / h.scale_x, (p.y - h.y) / h.scale_y)
}

/// Axis-aligned scene bounds of the object's geometry (stroke excluded).
#[must_use]
pub fn scene_bounds(obj: &DrawableObject) -> Rect {
    let corners = obj.shape.local_bounds().corners().map(|c| local_to_scene(obj, c));
    Rect::bounding(corners).unwrap_or_else(|| Rect::from_xywh(obj.header.x, obj.header.y, 0.0, 0.0))
}

/// Axis-aligned scene bounds including the painted stroke.
#[must_use]
pub fn paint_bounds(obj: &DrawableObject) -> Rect {
    let h = &obj.header;
    scene_bounds(obj).expand(h.stroke_width * 0.5 * h.scale_x.max(h.scale_y))
}

/// Union of the paint bounds of every object, or `None` for an empty scene.
#[must_use]
pub fn scene_extent(scene: &Scene) -> Option<Rect> {
    scene.objects().iter().map(paint_bounds).reduce(|a, b| a.union(&b))
}

// =============================================================
// Hit-testing
// =============================================================

/// Whether `scene_pt` lies on the object, allowing `slop` scene units of slack.
#[must_use]
pub fn hits_object(obj: &DrawableObject, scene_pt: Point, slop: f64) -> bool {
    let h = &obj.header;
    let local = scene_to_local(obj, scene_pt);
    let half = h.stroke_width * 0.5 + slop / h.scale_x.min(h.scale_y);

    match &obj.shape {
        Shape::Rectangle { .. } | Shape::Image { .. } | Shape::Text { .. } => {
            obj.shape.local_bounds().expand(half).contains(local)
        }
        Shape::Circle { radius } => local.distance(Point::new(*radius, *radius)) <= radius + half,
        Shape::Triangle { width, height } => {
            let a = Point::new(width * 0.5, 0.0);
            let b = Point::new(0.0, *height);
            let c = Point::new(*width, *height);
            point_in_triangle(local, a, b, c)
                || segment_distance(local, a, b) <= half
                || segment_distance(local, b, c) <= half
                || segment_distance(local, c, a) <= half
        }
        Shape::Line { dx, dy } => segment_distance(local, Point::new(0.0, 0.0), Point::new(*dx, *dy)) <= half,
        Shape::FreehandPath { points } => points.windows(2).any(|w| segment_distance(local, w[0], w[1]) <= half),
    }
}

/// Find what is under `scene_pt`: resize handles of a single selected object
/// first, then objects from the top of the paint order down.
#[must_use]
pub fn hit_test(scene_pt: Point, scene: &Scene, camera: &Camera, selected: &[ObjectId]) -> Option<Hit> {
    let slop = camera.screen_dist_to_scene(HANDLE_RADIUS_PX);

    if let [only] = selected
        && let Some(obj) = scene.get(only)
    {
        let bounds = scene_bounds(obj);
        for anchor in ResizeAnchor::ALL {
            if anchor.position(&bounds).distance(scene_pt) <= slop {
                return Some(Hit { object_id: obj.id, part: HitPart::ResizeHandle(anchor) });
            }
        }
    }

    scene
        .objects()
        .iter()
        .rev()
        .find(|obj| hits_object(obj, scene_pt, slop))
        .map(|obj| Hit { object_id: obj.id, part: HitPart::Body })
}

/// Ids of every object whose bounds intersect `rect`, in paint order.
#[must_use]
pub fn objects_in_rect(scene: &Scene, rect: &Rect) -> Vec<ObjectId> {
    scene.objects().iter().filter(|o| scene_bounds(o).intersects(rect)).map(|o| o.id).collect()
}

// =============================================================
// Resize
// =============================================================

/// Patch that resizes `orig` by dragging `anchor` by `delta` (scene units),
/// keeping the opposite edge of its scene bounds fixed. Axes the handle does
/// not move, and degenerate (zero-extent) axes, keep their scale.
#[must_use]
pub fn resize_patch(orig: &DrawableObject, anchor: ResizeAnchor, delta: Point) -> ObjectPatch {
    let b = scene_bounds(orig);
    let h = &orig.header;

    let factor = |sign: i8, extent: f64, d: f64| -> f64 {
        if sign == 0 || extent <= f64::EPSILON {
            return 1.0;
        }
        let grown = extent + f64::from(sign) * d;
        grown.max(MIN_RESIZE_EXTENT) / extent
    };
    let scale_x = h.scale_x * factor(anchor.x_sign(), b.width(), delta.x);
    let scale_y = h.scale_y * factor(anchor.y_sign(), b.height(), delta.y);

    let mut resized = orig.clone();
    resized.header.scale_x = scale_x;
    resized.header.scale_y = scale_y;
    let nb = scene_bounds(&resized);

    // Shift so the fixed edge lands where it was.
    let shift_x = if anchor.x_sign() < 0 { b.max.x - nb.max.x } else { b.min.x - nb.min.x };
    let shift_y = if anchor.y_sign() < 0 { b.max.y - nb.max.y } else { b.min.y - nb.min.y };

    ObjectPatch {
        x: Some(h.x + shift_x),
        y: Some(h.y + shift_y),
        scale_x: Some(scale_x),
        scale_y: Some(scale_y),
        ..ObjectPatch::default()
    }
}

// =============================================================
// Primitives
// =============================================================

/// Distance from `p` to the segment `a`–`b`.
#[must_use]
pub fn segment_distance(p: Point, a: Point, b: Point) -> f64 {
    let (vx, vy) = (b.x - a.x, b.y - a.y);
    let len_sq = vx * vx + vy * vy;
    if len_sq <= f64::EPSILON {
        return p.distance(a);
    }
    let t = (((p.x - a.x) * vx + (p.y - a.y) * vy) / len_sq).clamp(0.0, 1.0);
    p.distance(Point::new(a.x + t * vx, a.y + t * vy))
}

fn point_in_triangle(p: Point, a: Point, b: Point, c: Point) -> bool {
    let cross = |o: Point, u: Point, v: Point| (u.x - o.x) * (v.y - o.y) - (u.y - o.y) * (v.x - o.x);
    let d1 = cross(p, a, b);
    let d2 = cross(p, b, c);
    let d3 = cross(p, c, a);
    let has_neg = d1 < 0.0 || d2 < 0.0 || d3 < 0.0;
    let has_pos = d1 > 0.0 || d2 > 0.0 || d3 > 0.0;
    !(has_neg && has_pos)
}
