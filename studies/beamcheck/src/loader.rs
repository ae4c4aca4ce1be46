//! 射野图像加载器. 提供迭代器风格的数据集获取模式.

use ndarray::Array2;
use rt_berry::OwnedFieldSlice;
use std::path::{Path, PathBuf};
use std::{env, fs};

/// 获取射野图像基本路径.
///
/// 1. 若环境变量 `$BEAMCHECK_FIELD_DIR` 非空, 则返回其值;
/// 2. 否则, 返回 `$HOME/fields`.
pub fn field_dir_from_env_or_home() -> PathBuf {
    if let Ok(d) = env::var("BEAMCHECK_FIELD_DIR") {
        PathBuf::from(d)
    } else {
        let mut ans = dirs::home_dir().unwrap();
        ans.push("fields");
        ans
    }
}

/// 判断 `path` 是否是受支持的射野图像文件.
fn is_field_image(path: &Path) -> bool {
    let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
        return false;
    };
    matches!(ext.to_ascii_lowercase().as_str(), "png" | "jpg" | "jpeg")
}

/// 将 `path` 处的图像解码为射野切片. 彩色图像会先转换为 16 位灰度.
pub fn open_field<P: AsRef<Path>>(path: P) -> image::ImageResult<OwnedFieldSlice> {
    let img = image::open(path)?.into_luma16();
    let (width, height) = img.dimensions();
    let data = Array2::from_shape_fn((height as usize, width as usize), |(h, w)| {
        f32::from(img.get_pixel(w as u32, h as u32)[0])
    });
    Ok(data.into())
}

/// 从指定路径创建射野图像加载器. 返回的加载器会按文件名序迭代
/// `path` 下所有受支持的图像文件.
///
/// # 注意
///
/// 1. `path` 必须是目录, 否则程序 panic.
/// 2. 迭代时解码失败的文件会以 `Result::Error` 的形式返回.
pub fn field_loader<P: AsRef<Path>>(path: P) -> FieldLoader {
    let path = path.as_ref();
    assert!(path.is_dir());

    let mut files: Vec<PathBuf> = fs::read_dir(path)
        .expect("Reading field dir error")
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| is_field_image(p))
        .collect();
    files.sort();
    files.reverse();

    FieldLoader { files_rev: files }
}

/// 射野图像数据加载器.
#[derive(Debug)]
pub struct FieldLoader {
    files_rev: Vec<PathBuf>,
}

impl Iterator for FieldLoader {
    type Item = (PathBuf, image::ImageResult<OwnedFieldSlice>);

    fn next(&mut self) -> Option<Self::Item> {
        let file = self.files_rev.pop()?;
        let data = open_field(&file);
        Some((file, data))
    }
}

impl ExactSizeIterator for FieldLoader {
    #[inline]
    fn len(&self) -> usize {
        self.files_rev.len()
    }
}
