//! 射野图像的基础数据结构.
//!
//! 核心只处理单张二维灰度切片. 调用方 (文件解码器, 查看器, 批处理工具)
//! 负责把像素整理成 `ndarray` 数组后交给本模块的切片对象.

pub mod roi;
pub mod slice;
pub mod window;

pub use slice::{FieldSlice, FieldSliceMut, ImgWriteRaw, ImgWriteVis, OwnedFieldSlice};

pub use window::FieldWindow;
