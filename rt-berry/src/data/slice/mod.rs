//! 射野图像切片对象的操作.

mod core;
mod save;

pub use core::{FieldSlice, FieldSliceMut, OwnedFieldSlice};

pub use save::{ImgWriteRaw, ImgWriteVis};
