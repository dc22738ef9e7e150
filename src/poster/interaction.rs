use crate::poster::animation::{Fade, FadeDirection, FadeProgress, FadeTiming};
use crate::poster::composer::{Composition, CompositionStyle, GridGeometry};
use crate::poster::model::{PixelRect, ShapeId};
use std::collections::{HashMap, HashSet};
use std::time::Duration;

/// Pointer travel (pixels) while the primary button is down that turns a
/// press into a drag-erase.
pub const DRAG_THRESHOLD: f32 = 4.0;

/// Persistent visibility of a shape as seen by the painter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Visible,
    FadingOut,
    Hidden,
    FadingIn,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InteractionUpdate {
    /// Shapes whose alpha changed and need repainting.
    pub repaint: Vec<ShapeId>,
    /// True while any fade is in flight.
    pub animating: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Press {
    origin: (f32, f32),
    dragging: bool,
}

#[derive(Debug, Clone)]
pub struct InteractionState {
    timing: FadeTiming,
    layout: Option<(CompositionStyle, GridGeometry)>,
    targets: Vec<(ShapeId, PixelRect)>,
    hidden: HashSet<ShapeId>,
    fades: HashMap<ShapeId, Fade>,
    hovered: Option<ShapeId>,
    press: Option<Press>,
}

impl InteractionState {
    pub fn new(timing: FadeTiming) -> Self {
        Self {
            timing,
            layout: None,
            targets: Vec::new(),
            hidden: HashSet::new(),
            fades: HashMap::new(),
            hovered: None,
            press: None,
        }
    }

    pub fn timing(&self) -> &FadeTiming {
        &self.timing
    }

    /// Adopts the piece list of a fresh composition. Ids that no longer exist
    /// are dropped; a different style or grid geometry clears everything.
    /// Returns whether the geometry changed.
    pub fn sync_with(&mut self, composition: &Composition) -> bool {
        let layout = (composition.style, composition.geometry);
        let geometry_changed = self.layout != Some(layout);
        self.layout = Some(layout);
        self.targets = composition.targets().collect();

        if geometry_changed {
            self.clear();
            return true;
        }

        let live: HashSet<ShapeId> = self.targets.iter().map(|(id, _)| *id).collect();
        let before = self.hidden.len() + self.fades.len();
        self.hidden.retain(|id| live.contains(id));
        self.fades.retain(|id, _| live.contains(id));
        if self.hovered.is_some_and(|id| !live.contains(&id)) {
            self.hovered = None;
        }
        let pruned = before - (self.hidden.len() + self.fades.len());
        if pruned > 0 {
            tracing::debug!(pruned, "dropped state for shapes missing from redraw");
        }
        false
    }

    /// Drops the shape list and all visibility state.
    pub fn detach(&mut self) {
        self.layout = None;
        self.targets.clear();
        self.clear();
    }

    fn clear(&mut self) {
        self.hidden.clear();
        self.fades.clear();
        self.hovered = None;
        self.press = None;
    }

    /// Topmost shape whose bounds contain `point`.
    pub fn hit_test(&self, point: (f32, f32)) -> Option<ShapeId> {
        self.targets
            .iter()
            .rev()
            .find(|(_, bounds)| bounds.contains(point))
            .map(|(id, _)| *id)
    }

    pub fn alpha_of(&self, id: ShapeId) -> f32 {
        if self.hidden.contains(&id) {
            return 0.0;
        }
        self.fades.get(&id).map_or(1.0, |fade| fade.alpha)
    }

    pub fn visibility(&self, id: ShapeId) -> Visibility {
        if self.hidden.contains(&id) {
            return Visibility::Hidden;
        }
        match self.fades.get(&id) {
            Some(fade) if fade.is_click() => match fade.direction {
                FadeDirection::In => Visibility::FadingIn,
                _ => Visibility::FadingOut,
            },
            _ => Visibility::Visible,
        }
    }

    pub fn fade(&self, id: ShapeId) -> Option<&Fade> {
        self.fades.get(&id)
    }

    pub fn is_hidden(&self, id: ShapeId) -> bool {
        self.hidden.contains(&id)
    }

    pub fn hidden_count(&self) -> usize {
        self.hidden.len()
    }

    pub fn hovered(&self) -> Option<ShapeId> {
        self.hovered
    }

    pub fn is_animating(&self) -> bool {
        !self.fades.is_empty()
    }

    pub fn on_press(&mut self, point: (f32, f32)) -> InteractionUpdate {
        self.press = Some(Press {
            origin: point,
            dragging: false,
        });
        self.update(Vec::new())
    }

    pub fn on_pointer_move(&mut self, point: (f32, f32)) -> InteractionUpdate {
        let Some(mut press) = self.press else {
            return self.hover(point);
        };

        let mut repaint = Vec::new();
        if !press.dragging {
            let dx = point.0 - press.origin.0;
            let dy = point.1 - press.origin.1;
            if (dx * dx + dy * dy).sqrt() < DRAG_THRESHOLD {
                return self.update(repaint);
            }
            press.dragging = true;
            self.press = Some(press);
            if let Some(id) = self.hit_test(press.origin) {
                self.erase(id, &mut repaint);
            }
        }
        if let Some(id) = self.hit_test(point) {
            self.erase(id, &mut repaint);
        }
        self.update(repaint)
    }

    /// Ends a press. Without a drag it counts as a click at `point`.
    pub fn on_release(&mut self, point: (f32, f32)) -> InteractionUpdate {
        match self.press.take() {
            Some(Press {
                dragging: false, ..
            }) => self.on_click(point),
            _ => self.update(Vec::new()),
        }
    }

    pub fn on_click(&mut self, point: (f32, f32)) -> InteractionUpdate {
        let mut repaint = Vec::new();
        if let Some(id) = self.hit_test(point) {
            self.toggle(id);
            repaint.push(id);
        }
        self.update(repaint)
    }

    pub fn on_pointer_leave(&mut self) -> InteractionUpdate {
        self.hovered = None;
        self.press = None;
        self.update(Vec::new())
    }

    /// Advances every fade by one frame.
    pub fn tick(&mut self, dt: Duration) -> InteractionUpdate {
        let mut repaint = Vec::with_capacity(self.fades.len());
        let mut finished = Vec::new();
        for (id, fade) in self.fades.iter_mut() {
            repaint.push(*id);
            match fade.advance(dt, &self.timing) {
                FadeProgress::Running => {}
                FadeProgress::ReachedHidden => finished.push((*id, true)),
                FadeProgress::Settled => finished.push((*id, false)),
            }
        }
        for (id, hide) in finished {
            self.fades.remove(&id);
            if hide {
                self.hidden.insert(id);
            }
        }
        repaint.sort();
        self.update(repaint)
    }

    fn hover(&mut self, point: (f32, f32)) -> InteractionUpdate {
        let hit = self.hit_test(point);
        let mut repaint = Vec::new();
        if hit != self.hovered {
            self.hovered = hit;
            if let Some(id) = hit {
                if !self.hidden.contains(&id) && !self.fades.contains_key(&id) {
                    self.fades.insert(id, Fade::hover());
                    repaint.push(id);
                }
            }
        }
        self.update(repaint)
    }

    fn toggle(&mut self, id: ShapeId) {
        if self.hidden.remove(&id) {
            self.fades.insert(id, Fade::click_in(0.0));
            return;
        }
        let next = match self.fades.get(&id) {
            Some(fade) if fade.is_click() && fade.direction == FadeDirection::Out => {
                Fade::click_in(fade.alpha)
            }
            Some(fade) => Fade::click_out(fade.alpha),
            None => Fade::click_out(1.0),
        };
        self.fades.insert(id, next);
    }

    fn erase(&mut self, id: ShapeId, repaint: &mut Vec<ShapeId>) {
        if self.hidden.contains(&id) {
            return;
        }
        let from = self.fades.get(&id).map_or(1.0, |fade| fade.alpha);
        let already = self
            .fades
            .get(&id)
            .is_some_and(|fade| fade.is_click() && fade.direction == FadeDirection::Out);
        if !already {
            self.fades.insert(id, Fade::click_out(from));
            repaint.push(id);
        }
    }

    fn update(&self, repaint: Vec<ShapeId>) -> InteractionUpdate {
        InteractionUpdate {
            repaint,
            animating: self.is_animating(),
        }
    }
}

impl Default for InteractionState {
    fn default() -> Self {
        Self::new(FadeTiming::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::poster::composer::{compose, ComposerConfig, GridMode};
    use crate::poster::palette::PaletteCatalogue;
    use crate::poster::rng::SeededRng;

    const FRAME: Duration = Duration::from_millis(16);

    fn composition(size: (u32, u32), cell_size: u32) -> Composition {
        let config = ComposerConfig {
            grid: GridMode::Fixed {
                cell_size,
                density: 1.0,
            },
            text_probability: 0.0,
            ..ComposerConfig::default()
        };
        let palettes = PaletteCatalogue::builtin();
        let mut rng = SeededRng::new(1);
        compose(&mut rng, 1, size, palettes.palette_at(0), "", &config).unwrap()
    }

    fn synced() -> InteractionState {
        let mut state = InteractionState::default();
        state.sync_with(&composition((600, 480), 60));
        state
    }

    fn settle(state: &mut InteractionState) {
        let mut frames = 0;
        while state.tick(FRAME).animating {
            frames += 1;
            assert!(frames < 1000, "fades never settled");
        }
    }

    const CELL: ShapeId = ShapeId::new(1, 2);
    const INSIDE: (f32, f32) = (150.0, 90.0);

    #[test]
    fn two_clicks_return_to_visible() {
        let mut state = synced();
        assert_eq!(state.visibility(CELL), Visibility::Visible);

        let update = state.on_click(INSIDE);
        assert_eq!(update.repaint, vec![CELL]);
        assert!(update.animating);
        assert_eq!(state.visibility(CELL), Visibility::FadingOut);
        settle(&mut state);
        assert_eq!(state.visibility(CELL), Visibility::Hidden);
        assert_eq!(state.alpha_of(CELL), 0.0);

        state.on_click(INSIDE);
        assert!(!state.is_hidden(CELL));
        assert_eq!(state.visibility(CELL), Visibility::FadingIn);
        settle(&mut state);
        assert_eq!(state.visibility(CELL), Visibility::Visible);
        assert_eq!(state.alpha_of(CELL), 1.0);
        assert!(state.fade(CELL).is_none());
    }

    #[test]
    fn click_mid_fade_reverses_from_current_alpha() {
        let mut state = synced();
        state.on_click(INSIDE);
        for _ in 0..3 {
            state.tick(FRAME);
        }
        let alpha = state.alpha_of(CELL);
        assert!((alpha - 0.7).abs() < 1e-3);

        state.on_click(INSIDE);
        assert_eq!(state.visibility(CELL), Visibility::FadingIn);
        assert!((state.alpha_of(CELL) - alpha).abs() < 1e-6);
    }

    #[test]
    fn press_and_release_in_place_is_a_click() {
        let mut state = synced();
        state.on_press(INSIDE);
        state.on_pointer_move((151.0, 91.0));
        let update = state.on_release((151.0, 91.0));
        assert_eq!(update.repaint, vec![CELL]);
        assert_eq!(state.visibility(CELL), Visibility::FadingOut);
    }

    #[test]
    fn drag_erases_every_crossed_shape() {
        let mut state = synced();
        state.on_press((30.0, 30.0));
        let first = state.on_pointer_move((90.0, 30.0));
        assert_eq!(first.repaint, vec![ShapeId::new(0, 0), ShapeId::new(0, 1)]);
        state.on_pointer_move((150.0, 30.0));
        let release = state.on_release((150.0, 30.0));
        assert!(release.repaint.is_empty());

        for col in 0..3 {
            assert_eq!(state.visibility(ShapeId::new(0, col)), Visibility::FadingOut);
        }
        assert_eq!(state.visibility(ShapeId::new(0, 3)), Visibility::Visible);
        settle(&mut state);
        assert_eq!(state.hidden_count(), 3);
    }

    #[test]
    fn drag_does_not_revive_hidden_shapes() {
        let mut state = synced();
        state.on_click(INSIDE);
        settle(&mut state);
        state.on_press((100.0, 90.0));
        let update = state.on_pointer_move(INSIDE);
        assert!(!update.repaint.contains(&CELL));
        assert!(state.is_hidden(CELL));
    }

    #[test]
    fn drag_reverses_a_fading_in_shape() {
        let mut state = synced();
        state.on_click(INSIDE);
        settle(&mut state);
        state.on_click(INSIDE);
        for _ in 0..4 {
            state.tick(FRAME);
        }
        assert_eq!(state.visibility(CELL), Visibility::FadingIn);
        let alpha = state.alpha_of(CELL);
        assert!((alpha - 0.4).abs() < 1e-3);

        state.on_press((100.0, 90.0));
        let update = state.on_pointer_move(INSIDE);
        assert!(update.repaint.contains(&CELL));
        assert_eq!(state.visibility(CELL), Visibility::FadingOut);
        assert!((state.alpha_of(CELL) - alpha).abs() < 1e-6);

        settle(&mut state);
        assert!(state.is_hidden(CELL));
    }

    #[test]
    fn style_change_clears_state_for_the_same_grid() {
        let mut state = synced();
        state.on_click(INSIDE);
        settle(&mut state);

        let mut restyled = composition((600, 480), 60);
        restyled.style = CompositionStyle::Motif;
        assert!(state.sync_with(&restyled));
        assert_eq!(state.hidden_count(), 0);
    }

    #[test]
    fn hover_preview_never_touches_hidden_set() {
        let mut state = synced();
        let update = state.on_pointer_move(INSIDE);
        assert_eq!(update.repaint, vec![CELL]);
        assert_eq!(state.hovered(), Some(CELL));
        assert_eq!(state.visibility(CELL), Visibility::Visible);

        state.tick(Duration::from_millis(500));
        assert!((state.alpha_of(CELL) - 0.5).abs() < 1e-3);
        state.tick(Duration::from_millis(500));
        assert_eq!(state.alpha_of(CELL), 0.0);
        assert!(!state.is_hidden(CELL));

        settle(&mut state);
        assert_eq!(state.alpha_of(CELL), 1.0);
        assert_eq!(state.hidden_count(), 0);
    }

    #[test]
    fn hover_ignores_shapes_with_click_state() {
        let mut state = synced();
        state.on_click(INSIDE);
        state.on_pointer_move(INSIDE);
        assert!(state.fade(CELL).unwrap().is_click());

        settle(&mut state);
        state.on_pointer_leave();
        let update = state.on_pointer_move(INSIDE);
        assert!(update.repaint.is_empty());
        assert!(state.fade(CELL).is_none());
    }

    #[test]
    fn click_takes_over_a_hover_fade() {
        let mut state = synced();
        state.on_pointer_move(INSIDE);
        state.tick(Duration::from_millis(300));
        let alpha = state.alpha_of(CELL);

        state.on_click(INSIDE);
        let fade = state.fade(CELL).unwrap();
        assert!(fade.is_click());
        assert_eq!(fade.direction, FadeDirection::Out);
        assert!((fade.alpha - alpha).abs() < 1e-6);
        settle(&mut state);
        assert!(state.is_hidden(CELL));
    }

    #[test]
    fn pointer_leave_clears_hover_and_press() {
        let mut state = synced();
        state.on_press(INSIDE);
        state.on_pointer_leave();
        assert_eq!(state.hovered(), None);
        let update = state.on_release(INSIDE);
        assert!(update.repaint.is_empty());
    }

    #[test]
    fn miss_outside_grid_does_nothing() {
        let mut state = InteractionState::default();
        state.sync_with(&composition((610, 480), 60));
        let update = state.on_click((605.0, 10.0));
        assert!(update.repaint.is_empty());
        assert!(!update.animating);
    }

    #[test]
    fn same_geometry_keeps_state_and_new_geometry_clears_it() {
        let mut state = synced();
        state.on_click(INSIDE);
        settle(&mut state);
        state.on_click((30.0, 30.0));

        assert!(!state.sync_with(&composition((600, 480), 60)));
        assert!(state.is_hidden(CELL));
        assert!(state.fade(ShapeId::new(0, 0)).is_some());

        assert!(state.sync_with(&composition((700, 480), 60)));
        assert_eq!(state.hidden_count(), 0);
        assert!(!state.is_animating());
    }

    #[test]
    fn sync_prunes_ids_missing_from_the_new_list() {
        let mut state = synced();
        state.on_click(INSIDE);
        settle(&mut state);

        let mut sparse = composition((600, 480), 60);
        sparse.shapes.retain(|shape| shape.id != CELL);
        assert!(!state.sync_with(&sparse));
        assert!(!state.is_hidden(CELL));
        assert_eq!(state.hit_test(INSIDE), None);
    }
}
