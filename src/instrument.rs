//! # Module locations
//!
//! A detector module is located by its offset from the telescope boresight, expressed in polar
//! form as a [`ModuleOffset`] `(distance, position_angle)`. The angle is measured in the focal
//! plane, and the boresight transform adds the altitude to it to account for the alt-az mount.
//!
//! Modules are mounted in an instrument, which is itself shifted by `(offset_x, offset_y)` and
//! rotated by `rotation` with respect to the boresight. [`InstrumentPlacement::locate`] composes
//! both to give the true offset of a slot:
//!
//! ```text
//! (x, y)  = distance · (cos θ, sin θ)
//! (x', y') = R(rotation) · (x, y) + (offset_x, offset_y)
//! ```
//!
//! Detector geometry itself lives outside this crate; [`ModuleLocator`] is the seam through which
//! a geometry provider exposes its named modules. [`InstrumentLayout`] is a plain table
//! implementation with the PrimeCam and ModCam slot sets.
use std::collections::BTreeMap;

use nalgebra::{Rotation2, Vector2};
use serde::{Deserialize, Serialize};

use crate::constants::{Degree, RADEG};
use crate::scan_errors::ScanError;

/// Polar offset of a module from the boresight.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ModuleOffset {
    /// Angular distance from the boresight, in degrees.
    pub distance: Degree,
    /// Position angle in the focal plane, in degrees.
    pub position_angle: Degree,
}

impl ModuleOffset {
    /// The boresight itself.
    pub const BORESIGHT: ModuleOffset = ModuleOffset {
        distance: 0.0,
        position_angle: 0.0,
    };

    pub fn new(distance: Degree, position_angle: Degree) -> Self {
        ModuleOffset {
            distance,
            position_angle,
        }
    }

    /// Polar offset of a cartesian focal-plane position.
    pub fn from_xy(x: Degree, y: Degree) -> Self {
        ModuleOffset {
            distance: x.hypot(y),
            position_angle: y.atan2(x) / RADEG,
        }
    }

    pub fn to_xy(&self) -> Vector2<f64> {
        let theta = self.position_angle * RADEG;
        Vector2::new(theta.cos(), theta.sin()) * self.distance
    }

    /// Whether this offset is the boresight, which makes the transforms exact identities.
    pub fn is_boresight(&self) -> bool {
        self.distance == 0.0
    }
}

/// Offset and rotation of an instrument with respect to the boresight.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct InstrumentPlacement {
    pub offset_x: Degree,
    pub offset_y: Degree,
    pub rotation: Degree,
}

impl InstrumentPlacement {
    /// True offset from the boresight of a slot given relative to the instrument centre.
    pub fn locate(&self, slot: ModuleOffset) -> ModuleOffset {
        let placed = Rotation2::new(self.rotation * RADEG) * slot.to_xy()
            + Vector2::new(self.offset_x, self.offset_y);
        ModuleOffset::from_xy(placed.x, placed.y)
    }
}

/// Source of module locations, keyed by name.
pub trait ModuleLocator {
    /// How the instrument is mounted.
    fn placement(&self) -> InstrumentPlacement;

    /// Location of a named module or slot relative to the instrument centre.
    fn slot_location(&self, name: &str) -> Option<ModuleOffset>;

    /// Location of a named module or slot relative to the boresight.
    ///
    /// Errors
    /// ----------
    /// * [`ScanError::UnknownModule`] if `name` is neither a module nor a slot.
    fn true_location(&self, name: &str) -> Result<ModuleOffset, ScanError> {
        let slot = self
            .slot_location(name)
            .ok_or_else(|| ScanError::UnknownModule(name.to_string()))?;
        Ok(self.placement().locate(slot))
    }
}

/// Slot table of an instrument plus the named modules mounted in it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct InstrumentLayout {
    pub placement: InstrumentPlacement,
    slots: BTreeMap<String, ModuleOffset>,
    modules: BTreeMap<String, ModuleOffset>,
}

impl InstrumentLayout {
    pub fn new(placement: InstrumentPlacement) -> Self {
        InstrumentLayout {
            placement,
            ..Default::default()
        }
    }

    /// Single-slot test camera.
    pub fn mod_cam(placement: InstrumentPlacement) -> Self {
        let mut layout = InstrumentLayout::new(placement);
        layout.add_slot("c", ModuleOffset::BORESIGHT);
        layout
    }

    /// Seven optics tubes: a central one and six on a 1.78° ring at 60° intervals.
    pub fn prime_cam(placement: InstrumentPlacement) -> Self {
        const RING: Degree = 1.78;
        let mut layout = InstrumentLayout::new(placement);
        layout.add_slot("c", ModuleOffset::BORESIGHT);
        for (name, angle) in [
            ("i1", -90.0),
            ("i2", -30.0),
            ("i3", 30.0),
            ("i4", 90.0),
            ("i5", 150.0),
            ("i6", -150.0),
        ] {
            layout.add_slot(name, ModuleOffset::new(RING, angle));
        }
        layout
    }

    pub fn add_slot(&mut self, name: &str, location: ModuleOffset) {
        self.slots.insert(name.to_string(), location);
    }

    /// Mount a module at a slot of the table.
    ///
    /// Errors
    /// ----------
    /// * [`ScanError::UnknownModule`] if the slot does not exist.
    pub fn mount(&mut self, module: &str, slot: &str) -> Result<(), ScanError> {
        let location = self
            .slots
            .get(slot)
            .copied()
            .ok_or_else(|| ScanError::UnknownModule(slot.to_string()))?;
        self.modules.insert(module.to_string(), location);
        Ok(())
    }

    /// Mount a module at an arbitrary location.
    pub fn mount_at(&mut self, module: &str, location: ModuleOffset) {
        self.modules.insert(module.to_string(), location);
    }

    pub fn slot_names(&self) -> impl Iterator<Item = &str> {
        self.slots.keys().map(String::as_str)
    }
}

impl ModuleLocator for InstrumentLayout {
    fn placement(&self) -> InstrumentPlacement {
        self.placement
    }

    /// Modules take precedence over slots of the same name.
    fn slot_location(&self, name: &str) -> Option<ModuleOffset> {
        self.modules
            .get(name)
            .or_else(|| self.slots.get(name))
            .copied()
    }
}

#[cfg(test)]
mod instrument_test {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_identity_placement() {
        let slot = ModuleOffset::new(1.78, 30.0);
        let located = InstrumentPlacement::default().locate(slot);
        assert_relative_eq!(located.distance, 1.78, epsilon = 1e-12);
        assert_relative_eq!(located.position_angle, 30.0, epsilon = 1e-12);
    }

    #[test]
    fn test_rotation_and_offset() {
        let placement = InstrumentPlacement {
            offset_x: 1.0,
            offset_y: 0.0,
            rotation: 90.0,
        };
        // (1, 0) rotated to (0, 1), shifted to (1, 1)
        let located = placement.locate(ModuleOffset::new(1.0, 0.0));
        assert_relative_eq!(located.distance, 2f64.sqrt(), epsilon = 1e-12);
        assert_relative_eq!(located.position_angle, 45.0, epsilon = 1e-12);

        // the centre only sees the instrument offset
        let centre = placement.locate(ModuleOffset::BORESIGHT);
        assert_relative_eq!(centre.distance, 1.0, epsilon = 1e-12);
        assert_relative_eq!(centre.position_angle, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_layout_lookup() {
        let mut cam = InstrumentLayout::prime_cam(InstrumentPlacement::default());
        assert_eq!(cam.slot_names().count(), 7);
        cam.mount("SFH", "i2").unwrap();
        cam.mount_at("c", ModuleOffset::new(0.5, 0.0));

        let sfh = cam.true_location("SFH").unwrap();
        assert_relative_eq!(sfh.position_angle, -30.0, epsilon = 1e-12);
        // a module named like a slot shadows it
        assert_relative_eq!(cam.true_location("c").unwrap().distance, 0.5);
        assert_eq!(
            cam.true_location("EoRSpec").unwrap_err(),
            ScanError::UnknownModule("EoRSpec".into())
        );
        assert!(cam.mount("Mod280", "i9").is_err());
    }

    #[test]
    fn test_mod_cam() {
        let cam = InstrumentLayout::mod_cam(InstrumentPlacement::default());
        assert!(cam.true_location("c").unwrap().is_boresight());
    }
}
