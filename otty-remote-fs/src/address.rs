//! Address bar state: known drive locations plus one typed location.

use crate::path::{RemotePath, normalize};
use crate::protocol::{Drive, DriveKind};

const HOME_FOLDER_LABEL: &str = "Home Folder";
const DESKTOP_LABEL: &str = "Desktop";

/// Origin of an address bar entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationKind {
    /// Drive or special folder reported by the remote host.
    Known(DriveKind),
    /// Path entered by the user that matches no known location.
    Typed,
}

/// Address bar entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    label: String,
    path: RemotePath,
    kind: LocationKind,
}

impl Location {
    fn known(drive: &Drive) -> Self {
        let path = normalize(&drive.path);
        let label = match drive.kind {
            DriveKind::HomeFolder => String::from(HOME_FOLDER_LABEL),
            DriveKind::DesktopFolder => String::from(DESKTOP_LABEL),
            _ => path.to_string(),
        };

        Self {
            label,
            path,
            kind: LocationKind::Known(drive.kind),
        }
    }

    fn typed(path: RemotePath) -> Self {
        Self {
            label: path.to_string(),
            path,
            kind: LocationKind::Typed,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn path(&self) -> &RemotePath {
        &self.path
    }

    pub fn kind(&self) -> LocationKind {
        self.kind
    }

    /// Known locations have an icon and persist across navigation.
    pub fn is_known(&self) -> bool {
        matches!(self.kind, LocationKind::Known(_))
    }
}

/// Notification that the current path was (re)selected.
///
/// Emitted even when the path did not change, since receivers use it to
/// request a fresh listing.
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathChanged {
    pub path: RemotePath,
}

/// Ordered address bar locations and the current selection.
#[derive(Debug, Default)]
pub struct AddressState {
    locations: Vec<Location>,
    current: Option<usize>,
}

impl AddressState {
    pub fn new() -> Self {
        Self::default()
    }

    // --- Read access ---

    /// Return all locations in display order.
    pub fn locations(&self) -> &[Location] {
        &self.locations
    }

    /// Return the index of the selected location.
    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    /// Return the selected path, or the computer root when nothing is
    /// selected yet.
    pub fn current_path(&self) -> RemotePath {
        self.current
            .and_then(|index| self.locations.get(index))
            .map(|location| location.path.clone())
            .unwrap_or_else(RemotePath::computer)
    }

    /// Return whether a real directory is selected.
    pub fn has_current_path(&self) -> bool {
        !self.current_path().is_computer()
    }

    /// Return the path stored at `index`.
    pub fn path_at(&self, index: usize) -> Option<&RemotePath> {
        self.locations.get(index).map(Location::path)
    }

    /// Return the typed location, if any.
    pub fn typed_location(&self) -> Option<&Location> {
        self.locations.iter().find(|location| !location.is_known())
    }

    // --- Write access ---

    /// Replace the known locations with a fresh drive list and re-select the
    /// current path.
    ///
    /// Falls back to the first known location when nothing was selected or
    /// when the selected known location disappeared. Returns `None` when
    /// there is nothing to select.
    pub fn set_known_locations(
        &mut self,
        drives: &[Drive],
    ) -> Option<PathChanged> {
        let previous = self
            .current
            .and_then(|index| self.locations.get(index))
            .cloned();

        self.locations = drives.iter().map(Location::known).collect();
        self.current = None;

        let target = match previous {
            Some(location)
                if !location.is_known()
                    || self.find_known(&location.path).is_some() =>
            {
                location.path
            },
            _ => self.locations.first()?.path.clone(),
        };

        Some(self.set_current_path(target.as_str()))
    }

    /// Select `path`, inserting it as the typed location when it matches no
    /// known location.
    pub fn set_current_path(&mut self, path: &str) -> PathChanged {
        let path = normalize(path);

        self.locations
            .retain(|location| location.is_known() || location.path == path);

        let index = match self
            .locations
            .iter()
            .position(|location| location.path == path)
        {
            Some(index) => index,
            None => {
                log::debug!("address bar: adding typed location {path}");
                self.locations.push(Location::typed(path.clone()));
                self.locations.len() - 1
            },
        };

        self.current = Some(index);
        PathChanged { path }
    }

    /// Re-select the location at `index` (combo box activation).
    pub fn select(&mut self, index: usize) -> Option<PathChanged> {
        let path = self.path_at(index)?.clone();
        Some(self.set_current_path(path.as_str()))
    }

    /// Navigate into a child directory of the current path.
    pub fn to_child(&mut self, name: &str) -> PathChanged {
        let child = self.current_path().join(name);
        self.set_current_path(child.as_str())
    }

    /// Navigate to the parent of the current path; `None` at a root.
    pub fn to_parent(&mut self) -> Option<PathChanged> {
        let parent = self.current_path().parent()?;
        Some(self.set_current_path(parent.as_str()))
    }

    fn find_known(&self, path: &RemotePath) -> Option<usize> {
        self.locations
            .iter()
            .position(|location| location.is_known() && &location.path == path)
    }
}

#[cfg(test)]
mod tests {
    use super::{AddressState, LocationKind};
    use crate::path::normalize;
    use crate::protocol::{Drive, DriveKind};

    fn drives() -> Vec<Drive> {
        vec![
            Drive::new(DriveKind::Fixed, "C:\\"),
            Drive::new(DriveKind::HomeFolder, "C:\\Users\\otty"),
            Drive::new(DriveKind::DesktopFolder, "C:\\Users\\otty\\Desktop"),
        ]
    }

    fn typed_count(state: &AddressState) -> usize {
        state
            .locations()
            .iter()
            .filter(|location| !location.is_known())
            .count()
    }

    #[test]
    fn given_drive_list_when_applied_then_special_folders_are_labeled() {
        let mut state = AddressState::new();

        let changed = state
            .set_known_locations(&drives())
            .expect("first drive should be selected");

        assert_eq!(changed.path, normalize("C:/"));
        let labels: Vec<&str> =
            state.locations().iter().map(|l| l.label()).collect();
        assert_eq!(labels, vec!["C:/", "Home Folder", "Desktop"]);
        assert_eq!(
            state.locations()[1].kind(),
            LocationKind::Known(DriveKind::HomeFolder)
        );
    }

    #[test]
    fn given_typed_path_matching_known_location_when_set_then_known_is_selected()
     {
        let mut state = AddressState::new();
        let _ = state.set_known_locations(&drives());

        let changed = state.set_current_path("C:\\Users\\otty");

        assert_eq!(changed.path, normalize("C:/Users/otty"));
        assert_eq!(state.current_index(), Some(1));
        assert_eq!(typed_count(&state), 0);
    }

    #[test]
    fn given_sequence_of_typed_paths_when_set_then_single_typed_entry_exists()
    {
        let mut state = AddressState::new();
        let _ = state.set_known_locations(&drives());

        for path in ["D:/a", "D:\\a\\", "E:/", "C:/", "/srv/www", "/srv/www/"]
        {
            let _ = state.set_current_path(path);
            assert!(typed_count(&state) <= 1, "after {path}");
        }

        let typed = state.typed_location().expect("typed entry should exist");
        assert_eq!(typed.path(), &normalize("/srv/www"));
        assert_eq!(state.current_path(), normalize("/srv/www"));
    }

    #[test]
    fn given_same_path_when_set_twice_then_notification_fires_both_times() {
        let mut state = AddressState::new();

        let first = state.set_current_path("/tmp");
        let second = state.set_current_path("/tmp/");

        assert_eq!(first, second);
        assert_eq!(state.locations().len(), 1);
    }

    #[test]
    fn given_current_typed_path_when_drives_refreshed_then_path_is_preserved()
    {
        let mut state = AddressState::new();
        let _ = state.set_known_locations(&drives());
        let _ = state.set_current_path("C:/Users/otty/Documents");

        let changed = state
            .set_known_locations(&drives())
            .expect("path should be preserved");

        assert_eq!(changed.path, normalize("C:/Users/otty/Documents"));
        assert_eq!(typed_count(&state), 1);
        assert_eq!(state.locations().len(), 4);
    }

    #[test]
    fn given_removed_known_drive_when_drives_refreshed_then_first_is_selected()
    {
        let mut state = AddressState::new();
        let _ = state.set_known_locations(&[
            Drive::new(DriveKind::Fixed, "C:/"),
            Drive::new(DriveKind::Removable, "E:/"),
        ]);
        let _ = state.set_current_path("E:/");

        let changed = state
            .set_known_locations(&[Drive::new(DriveKind::Fixed, "C:/")])
            .expect("fallback should be selected");

        assert_eq!(changed.path, normalize("C:/"));
    }

    #[test]
    fn given_empty_drive_list_without_selection_when_applied_then_nothing_is_selected()
     {
        let mut state = AddressState::new();

        assert!(state.set_known_locations(&[]).is_none());
        assert!(!state.has_current_path());
        assert!(state.current_path().is_computer());
    }

    #[test]
    fn given_current_path_when_navigating_then_child_and_parent_are_resolved()
    {
        let mut state = AddressState::new();
        let _ = state.set_current_path("/home");

        let child = state.to_child("user");
        assert_eq!(child.path, normalize("/home/user"));

        let parent = state.to_parent().expect("parent should exist");
        assert_eq!(parent.path, normalize("/home"));

        let root = state.to_parent().expect("root should exist");
        assert_eq!(root.path, normalize("/"));
        assert!(state.to_parent().is_none());
    }

    #[test]
    fn given_location_index_when_selected_then_path_is_reselected() {
        let mut state = AddressState::new();
        let _ = state.set_known_locations(&drives());

        let changed = state.select(2).expect("index should be valid");

        assert_eq!(changed.path, normalize("C:/Users/otty/Desktop"));
        assert!(state.select(10).is_none());
    }
}
