//! Interactive region editor session.
//!
//! A pure gesture state machine: the hosting front end forwards pointer
//! events in viewport pixels and renders whatever [`EditorSession::live_rect`]
//! and the store contain. No widget toolkit is bound here.
//!
//! Two gestures share the pointer device, disambiguated by button:
//! the primary button draws (`Idle → Drawing → Idle`), the secondary button
//! pans. A finished drag lands in a single pending-rectangle slot and is only
//! committed to the store by an explicit [`commit`](EditorSession::commit)
//! with a name. Simultaneous draw+pan is undefined by contract, so whichever
//! gesture is active simply wins and the other button is ignored.

use crate::geometry::Rect;
use crate::mapper::{ViewTransform, ZOOM_STEP};
use crate::store::RegionStore;
use crate::RegionError;

/// Pointer button identity, used to disambiguate gestures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    /// Draws the selection rectangle.
    Primary,
    /// Pans the view.
    Secondary,
}

/// Result of a commit attempt.
///
/// The two failure cases are ordinary user-visible outcomes, not errors:
/// the front end shows a message and nothing changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    /// The pending rectangle was stored under the given name.
    Saved,
    /// No name was supplied.
    EmptyName,
    /// No rectangle has been drawn since the last commit.
    NothingPending,
}

#[derive(Debug, Clone, Copy)]
enum DragState {
    Idle,
    Drawing { anchor: (f64, f64), cursor: (f64, f64) },
}

/// One interactive editing session against a reference document.
///
/// Owns the [`RegionStore`] being populated and the [`ViewTransform`]
/// describing the current zoom/pan; both have the session's lifetime.
/// Call [`finish`](EditorSession::finish) to take the store for freezing.
#[derive(Debug)]
pub struct EditorSession {
    store: RegionStore,
    view: ViewTransform,
    drag: DragState,
    pan_anchor: Option<(f64, f64)>,
    pending: Option<Rect>,
}

impl EditorSession {
    pub fn new(view: ViewTransform) -> Self {
        Self::with_store(RegionStore::new(), view)
    }

    /// Resume editing with previously loaded regions.
    pub fn with_store(store: RegionStore, view: ViewTransform) -> Self {
        Self {
            store,
            view,
            drag: DragState::Idle,
            pan_anchor: None,
            pending: None,
        }
    }

    pub fn regions(&self) -> &RegionStore {
        &self.store
    }

    pub fn view(&self) -> &ViewTransform {
        &self.view
    }

    /// The document-space rectangle awaiting a name, if any.
    pub fn pending(&self) -> Option<&Rect> {
        self.pending.as_ref()
    }

    /// The in-progress drag rectangle in viewport pixels, for rendering.
    pub fn live_rect(&self) -> Option<Rect> {
        match self.drag {
            DragState::Drawing { anchor, cursor } => {
                Some(Rect::normalized(anchor.0, anchor.1, cursor.0, cursor.1))
            }
            DragState::Idle => None,
        }
    }

    pub fn pointer_pressed(&mut self, button: PointerButton, x: f64, y: f64) {
        match button {
            PointerButton::Primary => {
                if self.pan_anchor.is_none() {
                    self.drag = DragState::Drawing {
                        anchor: (x, y),
                        cursor: (x, y),
                    };
                }
            }
            PointerButton::Secondary => {
                if matches!(self.drag, DragState::Idle) {
                    self.pan_anchor = Some((x, y));
                }
            }
        }
    }

    pub fn pointer_moved(&mut self, x: f64, y: f64) {
        if let DragState::Drawing { anchor, .. } = self.drag {
            self.drag = DragState::Drawing {
                anchor,
                cursor: (x, y),
            };
        } else if let Some((ax, ay)) = self.pan_anchor {
            // Dragging the content: the view moves opposite the pointer.
            self.view.pan_by(ax - x, ay - y);
            self.pan_anchor = Some((x, y));
        }
    }

    pub fn pointer_released(&mut self, button: PointerButton, x: f64, y: f64) {
        match button {
            PointerButton::Primary => {
                if let DragState::Drawing { anchor, .. } = self.drag {
                    let viewport = Rect::normalized(anchor.0, anchor.1, x, y);
                    self.pending = Some(self.view.to_document(&viewport));
                    self.drag = DragState::Idle;
                }
            }
            PointerButton::Secondary => {
                self.pan_anchor = None;
            }
        }
    }

    /// Commit the pending rectangle into the store under `name`.
    pub fn commit(&mut self, name: &str) -> CommitOutcome {
        if name.trim().is_empty() {
            return CommitOutcome::EmptyName;
        }
        let Some(rect) = self.pending.take() else {
            return CommitOutcome::NothingPending;
        };
        self.store.put(name.trim(), rect);
        CommitOutcome::Saved
    }

    /// Remove the region whose rendered outline contains the click point.
    ///
    /// Hit-testing happens in viewport space: every stored document
    /// rectangle is forward-transformed through the *current* view, so the
    /// test can never go stale across zoom/pan changes. The first hit in
    /// insertion order is removed and its name returned.
    pub fn delete_at(&mut self, x: f64, y: f64) -> Option<String> {
        let hit = self
            .store
            .all()
            .iter()
            .find(|(_, rect)| self.view.to_viewport(rect).contains_point(x, y))
            .map(|(name, _)| name.clone())?;
        self.store.remove(&hit);
        Some(hit)
    }

    /// Zoom in one step, anchored at the viewport center.
    pub fn zoom_in(&mut self) {
        self.apply_zoom(self.view.zoom() * ZOOM_STEP);
    }

    /// Zoom out one step, anchored at the viewport center.
    pub fn zoom_out(&mut self) {
        self.apply_zoom(self.view.zoom() / ZOOM_STEP);
    }

    fn apply_zoom(&mut self, zoom: f64) {
        // An in-flight drag is anchored in now-stale viewport pixels.
        self.drag = DragState::Idle;
        self.view.set_zoom(zoom);
    }

    /// Notify the session of a host window resize.
    pub fn view_resized(&mut self, width: f64, height: f64) {
        self.view.set_view_size(width, height);
    }

    /// Replace the whole in-progress session from serialized entries.
    ///
    /// Atomic like [`RegionStore::load_from`]: on error the session keeps
    /// its previous regions. Success clears the pending slot and any
    /// in-flight drag; the caller should re-render everything.
    pub fn load<I>(&mut self, entries: I) -> Result<(), RegionError>
    where
        I: IntoIterator<Item = (String, [f64; 4])>,
    {
        self.store.load_from(entries)?;
        self.pending = None;
        self.drag = DragState::Idle;
        Ok(())
    }

    /// End the session, yielding the populated store.
    pub fn finish(self) -> RegionStore {
        self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::PageBBox;
    use crate::mapper::YAxis;

    fn session() -> EditorSession {
        // 600x800pt page at 2px/pt, 1000x1000 window, PDF-style axis.
        let view = ViewTransform::new(
            PageBBox::new(0.0, 0.0, 600.0, 800.0),
            2.0,
            1000.0,
            1000.0,
            YAxis::BottomLeft,
        );
        EditorSession::new(view)
    }

    fn draw(session: &mut EditorSession, from: (f64, f64), to: (f64, f64)) {
        session.pointer_pressed(PointerButton::Primary, from.0, from.1);
        session.pointer_moved(to.0, to.1);
        session.pointer_released(PointerButton::Primary, to.0, to.1);
    }

    #[test]
    fn drag_produces_pending_document_rect() {
        let mut s = session();
        // Top band in viewport pixels: x 100..1100 is off-window but valid.
        draw(&mut s, (100.0, 40.0), (1100.0, 160.0));

        let pending = *s.pending().expect("pending rect after release");
        assert!((pending.x0 - 50.0).abs() < 1e-9);
        assert!((pending.y0 - 720.0).abs() < 1e-9);
        assert!((pending.x1 - 550.0).abs() < 1e-9);
        assert!((pending.y1 - 780.0).abs() < 1e-9);
        assert!(s.live_rect().is_none());
    }

    #[test]
    fn live_rect_tracks_cursor_during_drag() {
        let mut s = session();
        s.pointer_pressed(PointerButton::Primary, 10.0, 10.0);
        assert_eq!(s.live_rect(), Some(Rect::normalized(10.0, 10.0, 10.0, 10.0)));
        s.pointer_moved(50.0, 30.0);
        assert_eq!(s.live_rect(), Some(Rect::normalized(10.0, 10.0, 50.0, 30.0)));
        assert!(s.pending().is_none());
    }

    #[test]
    fn reversed_drag_normalizes() {
        let mut s = session();
        draw(&mut s, (500.0, 500.0), (100.0, 100.0));
        let pending = *s.pending().unwrap();
        assert!(pending.x0 < pending.x1);
        assert!(pending.y0 < pending.y1);
    }

    #[test]
    fn commit_moves_pending_into_store_and_clears_slot() {
        let mut s = session();
        draw(&mut s, (100.0, 40.0), (1100.0, 160.0));

        assert_eq!(s.commit("Title"), CommitOutcome::Saved);
        assert!(s.pending().is_none());
        assert!(s.regions().get("Title").is_some());
    }

    #[test]
    fn commit_without_pending_is_reported_not_stored() {
        let mut s = session();
        assert_eq!(s.commit("Title"), CommitOutcome::NothingPending);
        assert!(s.regions().is_empty());
    }

    #[test]
    fn commit_with_blank_name_keeps_pending() {
        let mut s = session();
        draw(&mut s, (0.0, 0.0), (100.0, 100.0));
        assert_eq!(s.commit("   "), CommitOutcome::EmptyName);
        assert!(s.pending().is_some());
        assert!(s.regions().is_empty());
    }

    #[test]
    fn commit_trims_name() {
        let mut s = session();
        draw(&mut s, (0.0, 0.0), (100.0, 100.0));
        assert_eq!(s.commit("  Title "), CommitOutcome::Saved);
        assert!(s.regions().get("Title").is_some());
    }

    #[test]
    fn secondary_button_pans_without_touching_drawing_state() {
        let mut s = session();
        let before = s.view().pan();
        s.pointer_pressed(PointerButton::Secondary, 500.0, 500.0);
        s.pointer_moved(400.0, 450.0);
        s.pointer_released(PointerButton::Secondary, 400.0, 450.0);

        // Pan is clamped at zoom 1.0 in a window larger than needed only on
        // one axis; x moved within range.
        let after = s.view().pan();
        assert!(after.0 >= before.0);
        assert!(s.pending().is_none());
        assert!(s.live_rect().is_none());
    }

    #[test]
    fn pan_press_ignored_while_drawing() {
        let mut s = session();
        s.pointer_pressed(PointerButton::Primary, 10.0, 10.0);
        s.pointer_pressed(PointerButton::Secondary, 500.0, 500.0);
        let pan_before = s.view().pan();
        s.pointer_moved(600.0, 600.0);
        assert_eq!(s.view().pan(), pan_before);
        assert!(s.live_rect().is_some());
    }

    #[test]
    fn delete_at_removes_hit_region_in_current_view() {
        let mut s = session();
        draw(&mut s, (100.0, 40.0), (1100.0, 160.0));
        s.commit("Title");

        // Click inside the rendered outline.
        assert_eq!(s.delete_at(500.0, 100.0), Some("Title".to_string()));
        assert!(s.regions().is_empty());
        assert_eq!(s.delete_at(500.0, 100.0), None);
    }

    #[test]
    fn delete_hit_test_follows_zoom_changes() {
        let mut s = session();
        draw(&mut s, (100.0, 40.0), (1100.0, 160.0));
        s.commit("Title");

        s.zoom_in();
        // The stored document rect, transformed through the *current* view.
        let v = s.view().to_viewport(s.regions().get("Title").unwrap());
        let (cx, cy) = v.center();
        assert_eq!(s.delete_at(cx, cy), Some("Title".to_string()));
    }

    #[test]
    fn zoom_cancels_in_flight_drag_but_keeps_pending() {
        let mut s = session();
        draw(&mut s, (0.0, 0.0), (100.0, 100.0));
        s.pointer_pressed(PointerButton::Primary, 200.0, 200.0);
        s.zoom_in();
        assert!(s.live_rect().is_none());
        assert!(s.pending().is_some());
    }

    #[test]
    fn load_replaces_session_and_clears_pending() {
        let mut s = session();
        draw(&mut s, (0.0, 0.0), (100.0, 100.0));
        s.commit("Old");
        draw(&mut s, (0.0, 0.0), (50.0, 50.0));
        assert!(s.pending().is_some());

        s.load(vec![("New".to_string(), [1.0, 2.0, 3.0, 4.0])]).unwrap();
        assert!(s.pending().is_none());
        let names: Vec<&str> = s.regions().names().collect();
        assert_eq!(names, vec!["New"]);
    }

    #[test]
    fn failed_load_keeps_previous_regions() {
        let mut s = session();
        draw(&mut s, (0.0, 0.0), (100.0, 100.0));
        s.commit("Keep");

        let err = s.load(vec![("".to_string(), [0.0, 0.0, 1.0, 1.0])]);
        assert!(err.is_err());
        assert!(s.regions().get("Keep").is_some());
    }

    #[test]
    fn finish_yields_store() {
        let mut s = session();
        draw(&mut s, (0.0, 0.0), (100.0, 100.0));
        s.commit("A");
        let store = s.finish();
        assert_eq!(store.len(), 1);
    }
}
