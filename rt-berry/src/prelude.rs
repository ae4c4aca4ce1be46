//! 🍇欢迎光临🍓
//!
//! 涵盖了本 crate 一系列常用的功能.

pub use crate::{ClickPos, Idx2d};

pub use crate::data::slice::{FieldSlice, FieldSliceMut, ImgWriteRaw, ImgWriteVis, OwnedFieldSlice};
pub use crate::data::window::FieldWindow;

pub use crate::roi::{CentralRoi, PixelDisc};

pub use crate::consts::mark::{PROFILE_BAND, UNIFORMITY_MAX, UNIFORMITY_MIN};

pub use crate::profile::{analyze_profiles, process_profile, BeamProfile, FieldBoundary, Profiles};
pub use crate::uniformity::{analyze_uniformity, Uniformity};
