//! 图像的持久化存储.

use crate::{FieldSlice, FieldSliceMut};
use image::ImageResult;
use std::path::Path;

/// 表明一个可以通过 **可视化友好** 模式持久化存储的图像对象.
///
/// `ImgWriteVis` trait 的意图是, 图像将以 "可视化友好"
/// 的方式保存, 而不是 "as is" 的方式. 射野图像以任意剂量标度存储,
/// 保存时会用默认的 EPID 可视化窗口规范化到 8 位灰度,
/// 分析标记 (测量带与极值掩膜) 也因此在导出图上肉眼可辨.
pub trait ImgWriteVis {
    /// 按照一定的可视化规则将图片保存到 `path` 路径.
    fn save<P: AsRef<Path>>(&self, path: P) -> ImageResult<()>;
}

/// 表明一个可以通过 **按原样** 模式持久化存储的图像对象.
///
/// `ImgWriteRaw` trait 的额外意图是, 图像将按原样保存.
/// 超出 `0..=255` 的像素值会被饱和截断, 因此该模式仅适合本身就以
/// 8 位灰度标度存储的射野图像.
pub trait ImgWriteRaw {
    /// 按原样将图片保存到 `path` 路径.
    fn save_raw<P: AsRef<Path>>(&self, path: P) -> ImageResult<()>;
}

macro_rules! impl_field_vis {
    ($($field: ty),+) => {
        $(
            /// 窗位 2048, 窗宽 4096.
            impl ImgWriteVis for $field {
                fn save<P: AsRef<Path>>(&self, path: P) -> ImageResult<()> {
                    let (height, width) = self.shape();
                    let mut buf = image::GrayImage::new(width as u32, height as u32);
                    const WINDOW: crate::FieldWindow = crate::FieldWindow::from_epid_visual();
                    for ((h, w), &dose) in self.indexed_iter() {
                        let gray = WINDOW.eval(dose).unwrap();
                        buf.put_pixel(w as u32, h as u32, image::Luma([gray]));
                    }
                    buf.save(path)
                }
            }
        )+
    };
}

macro_rules! impl_field_raw {
    ($($field: ty),+) => {
        $(
            /// 按原样存储, 饱和截断到 `0..=255`.
            impl ImgWriteRaw for $field {
                fn save_raw<P: AsRef<Path>>(&self, path: P) -> ImageResult<()> {
                    let (height, width) = self.shape();
                    let mut buf = image::GrayImage::new(width as u32, height as u32);
                    for ((h, w), &pix) in self.indexed_iter() {
                        buf.put_pixel(w as u32, h as u32, image::Luma([pix.round() as u8]));
                    }
                    buf.save(path)
                }
            }
        )+
    };
}

impl_field_vis!(FieldSlice<'_>, FieldSliceMut<'_>);
impl_field_raw!(FieldSlice<'_>, FieldSliceMut<'_>);
