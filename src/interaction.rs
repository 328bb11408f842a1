use crate::camera::Camera;
use crate::config::Tunables;
use crate::scene::{NodeClass, NodeId, Scene};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    /// Context button; never changes the selection.
    Secondary,
    Middle,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    pub fn any(&self) -> bool {
        self.shift || self.ctrl || self.alt || self.meta
    }
}

/// Pointer press or drag in device pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub x: f64,
    pub y: f64,
    pub button: PointerButton,
    pub modifiers: Modifiers,
}

impl PointerEvent {
    pub fn primary(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            button: PointerButton::Primary,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn with_button(mut self, button: PointerButton) -> Self {
        self.button = button;
        self
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

/// Mouse wheel rotation; positive notches zoom out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WheelEvent {
    pub notches: i32,
    pub modifiers: Modifiers,
}

/// The single active gesture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gesture {
    Idle,
    Dragging(NodeId),
    /// Last pointer position in device pixels.
    Panning { last_x: f64, last_y: f64 },
}

/// Pointer handling over a live scene: selection, node dragging, panning and zoom.
///
/// The controller never triggers a re-layout. A gesture started on one scene is
/// dropped as soon as an event arrives for a scene of a different generation.
#[derive(Debug, Clone, PartialEq)]
pub struct InteractionController {
    gesture: Gesture,
    selection: Vec<NodeId>,
    generation: u64,
}

impl Default for InteractionController {
    fn default() -> Self {
        Self::new()
    }
}

impl InteractionController {
    pub fn new() -> Self {
        Self {
            gesture: Gesture::Idle,
            selection: Vec::new(),
            generation: 0,
        }
    }

    pub fn gesture(&self) -> Gesture {
        self.gesture
    }

    /// Selected nodes in the order they were selected.
    pub fn selection(&self) -> &[NodeId] {
        &self.selection
    }

    /// Forgets the gesture and selection, e.g. after a redraw.
    pub fn reset(&mut self, generation: u64) {
        self.gesture = Gesture::Idle;
        self.selection.clear();
        self.generation = generation;
    }

    pub fn pointer_down(&mut self, scene: &mut Scene, camera: &Camera, event: PointerEvent) {
        self.sync(scene);
        let point = camera.view_to_scene(event.x, event.y);
        match scene.node_at(point) {
            Some(id) => {
                let selectable = scene
                    .node(id)
                    .is_some_and(|node| node.class == NodeClass::Regular);
                if event.button == PointerButton::Primary && selectable && !scene.is_marked(id) {
                    scene.set_marked(id, true);
                    self.selection.push(id);
                    log::trace!("selected {id}");
                }
                self.gesture = Gesture::Dragging(id);
            }
            None => {
                if !event.modifiers.any() && event.button != PointerButton::Secondary {
                    self.clear_selection(scene);
                }
                self.gesture = Gesture::Panning {
                    last_x: event.x,
                    last_y: event.y,
                };
            }
        }
    }

    pub fn pointer_drag(&mut self, scene: &mut Scene, camera: &mut Camera, event: PointerEvent) {
        if !self.sync(scene) {
            return;
        }
        match self.gesture {
            Gesture::Idle => {}
            Gesture::Dragging(id) => {
                let point = camera.view_to_scene(event.x, event.y);
                scene.set_position(id, point);
            }
            Gesture::Panning { last_x, last_y } => {
                camera.pan_pixels(event.x - last_x, event.y - last_y);
                self.gesture = Gesture::Panning {
                    last_x: event.x,
                    last_y: event.y,
                };
            }
        }
    }

    pub fn pointer_up(&mut self) {
        self.gesture = Gesture::Idle;
    }

    /// Zooms by one step per notch while a modifier is held. Returns whether the zoom changed.
    pub fn wheel(&mut self, camera: &mut Camera, event: WheelEvent, tunables: &Tunables) -> bool {
        if !event.modifiers.any() || event.notches == 0 {
            return false;
        }
        let before = camera.view_percent();
        camera.set_view_percent(before + event.notches as f64 * tunables.zoom_step, tunables);
        let changed = camera.view_percent() != before;
        if changed {
            log::trace!("view percent {before} -> {}", camera.view_percent());
        }
        changed
    }

    pub fn clear_selection(&mut self, scene: &mut Scene) {
        for id in self.selection.drain(..) {
            scene.set_marked(id, false);
        }
    }

    /// Drops state belonging to an older scene. Returns `false` if a gesture was discarded.
    fn sync(&mut self, scene: &Scene) -> bool {
        if scene.generation() == self.generation {
            return true;
        }
        if self.gesture != Gesture::Idle {
            log::warn!(
                "discarding {:?} from scene generation {} after redraw",
                self.gesture,
                self.generation
            );
        }
        self.reset(scene.generation());
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{Bounds, Point};

    fn scene() -> Scene {
        let mut scene = Scene::new(0);
        let root = scene.add_node("1".into(), None, 0);
        let a = scene.add_node("2".into(), Some(root), 1);
        let b = scene.add_node("3".into(), Some(root), 1);
        scene.add_edge(root, a);
        scene.add_edge(root, b);
        for (id, x, y) in [(root, 0.0, 0.0), (a, -50.0, 100.0), (b, 50.0, 100.0)] {
            scene.set_position(id, Point::new(x, y));
            let node = scene.node_mut(id).unwrap();
            node.width = 20.0;
            node.height = 20.0;
        }
        scene
    }

    /// One pixel per unit, scene origin at pixel (100, 100).
    fn camera() -> Camera {
        let mut camera = Camera::new(200.0, 200.0);
        camera.fit(Bounds::around(Point::ORIGIN, 200.0, 200.0), 1.0);
        camera
    }

    #[test]
    fn clicking_node_marks_it_and_its_edges() {
        let (mut scene, camera) = (scene(), camera());
        let mut controller = InteractionController::new();
        controller.pointer_down(&mut scene, &camera, PointerEvent::primary(50.0, 200.0));
        assert_eq!(controller.selection(), &[NodeId(1)]);
        assert!(scene.is_marked(NodeId(1)));
        assert!(scene.edges()[0].marked);
        assert!(!scene.edges()[1].marked);
        assert_eq!(controller.gesture(), Gesture::Dragging(NodeId(1)));
    }

    #[test]
    fn clicking_canvas_clears_selection() {
        let (mut scene, camera) = (scene(), camera());
        let mut controller = InteractionController::new();
        controller.pointer_down(&mut scene, &camera, PointerEvent::primary(100.0, 100.0));
        controller.pointer_up();
        controller.pointer_down(&mut scene, &camera, PointerEvent::primary(150.0, 200.0));
        controller.pointer_up();
        assert_eq!(controller.selection().len(), 2);

        controller.pointer_down(&mut scene, &camera, PointerEvent::primary(5.0, 5.0));
        assert!(controller.selection().is_empty());
        assert_eq!(scene.marked_nodes().count(), 0);
        assert!(scene.edges().iter().all(|edge| !edge.marked));
        assert!(matches!(controller.gesture(), Gesture::Panning { .. }));
    }

    #[test]
    fn modifiers_or_secondary_button_keep_selection() {
        let (mut scene, camera) = (scene(), camera());
        let mut controller = InteractionController::new();
        controller.pointer_down(&mut scene, &camera, PointerEvent::primary(100.0, 100.0));
        controller.pointer_up();

        let shift = Modifiers {
            shift: true,
            ..Modifiers::NONE
        };
        let event = PointerEvent::primary(5.0, 5.0).with_modifiers(shift);
        controller.pointer_down(&mut scene, &camera, event);
        controller.pointer_up();
        assert_eq!(controller.selection(), &[NodeId(0)]);

        controller.pointer_down(
            &mut scene,
            &camera,
            PointerEvent::primary(5.0, 5.0).with_button(PointerButton::Secondary),
        );
        assert_eq!(controller.selection(), &[NodeId(0)]);
    }

    #[test]
    fn secondary_button_drags_without_selecting() {
        let (mut scene, mut camera) = (scene(), camera());
        let mut controller = InteractionController::new();
        let press = PointerEvent::primary(150.0, 200.0).with_button(PointerButton::Secondary);
        controller.pointer_down(&mut scene, &camera, press);
        assert!(controller.selection().is_empty());
        assert_eq!(controller.gesture(), Gesture::Dragging(NodeId(2)));

        controller.pointer_drag(&mut scene, &mut camera, PointerEvent::primary(160.0, 180.0));
        assert_eq!(scene.node(NodeId(2)).unwrap().position, Some(Point::new(60.0, 80.0)));
        controller.pointer_up();
        assert_eq!(controller.gesture(), Gesture::Idle);
    }

    #[test]
    fn reclicking_marked_node_keeps_it_marked() {
        let (mut scene, camera) = (scene(), camera());
        let mut controller = InteractionController::new();
        controller.pointer_down(&mut scene, &camera, PointerEvent::primary(100.0, 100.0));
        controller.pointer_up();
        controller.pointer_down(&mut scene, &camera, PointerEvent::primary(100.0, 100.0));
        assert_eq!(controller.selection(), &[NodeId(0)]);
        assert!(scene.is_marked(NodeId(0)));
    }

    #[test]
    fn panning_follows_pointer_deltas() {
        let (mut scene, mut camera) = (scene(), camera());
        let mut controller = InteractionController::new();
        controller.pointer_down(&mut scene, &camera, PointerEvent::primary(10.0, 10.0));
        controller.pointer_drag(&mut scene, &mut camera, PointerEvent::primary(30.0, 15.0));
        controller.pointer_drag(&mut scene, &mut camera, PointerEvent::primary(40.0, 15.0));
        assert_eq!(camera.center(), Point::new(-30.0, -5.0));
        controller.pointer_up();
        controller.pointer_drag(&mut scene, &mut camera, PointerEvent::primary(90.0, 90.0));
        assert_eq!(camera.center(), Point::new(-30.0, -5.0));
    }

    #[test]
    fn wheel_zoom_requires_modifier_and_clamps() {
        let mut camera = camera();
        let tunables = Tunables::default();
        let mut controller = InteractionController::new();
        let plain = WheelEvent {
            notches: 1,
            modifiers: Modifiers::NONE,
        };
        assert!(!controller.wheel(&mut camera, plain, &tunables));
        assert_eq!(camera.view_percent(), 1.0);

        let ctrl = Modifiers {
            ctrl: true,
            ..Modifiers::NONE
        };
        let zoom_out = WheelEvent {
            notches: 2,
            modifiers: ctrl,
        };
        assert!(controller.wheel(&mut camera, zoom_out, &tunables));
        assert!((camera.view_percent() - 1.1).abs() < 1e-6);
        controller.wheel(&mut camera, WheelEvent { notches: -100, modifiers: ctrl }, &tunables);
        assert_eq!(camera.view_percent(), 0.05);
        let zoom_in = WheelEvent {
            notches: -1,
            modifiers: ctrl,
        };
        assert!(!controller.wheel(&mut camera, zoom_in, &tunables));
    }

    #[test]
    fn stale_gesture_is_discarded_after_redraw() {
        let (mut scene, mut camera) = (scene(), camera());
        let mut controller = InteractionController::new();
        controller.pointer_down(&mut scene, &camera, PointerEvent::primary(100.0, 100.0));
        assert_eq!(controller.gesture(), Gesture::Dragging(NodeId(0)));

        let mut redrawn = self::scene();
        redrawn.set_generation(1);
        controller.pointer_drag(&mut redrawn, &mut camera, PointerEvent::primary(120.0, 120.0));
        assert_eq!(controller.gesture(), Gesture::Idle);
        assert!(controller.selection().is_empty());
        assert_eq!(redrawn.node(NodeId(0)).unwrap().position, Some(Point::ORIGIN));
    }
}
