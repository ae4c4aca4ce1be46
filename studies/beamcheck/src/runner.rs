//! 程序运行函数.

use crate::loader;
use crate::report::{CheckResult, FieldCheck};
use log::{info, warn};
use rt_berry::prelude::*;
use std::path::{Path, PathBuf};
use std::time::Instant;
use std::{fs, thread};

/// 实际运行.
pub fn run() -> CheckResult {
    let field_dir = loader::field_dir_from_env_or_home();
    assert!(field_dir.is_dir());
    let p = field_dir.as_path();

    // 短路判断
    assert!(
        loader::field_loader(p).next().is_some_and(|(_, r)| r.is_ok()),
        "Loading field dataset config error"
    );

    let out_dir = field_dir.join("annotated");
    fs::create_dir_all(&out_dir).expect("Creating output dir error");
    let out = out_dir.as_path();

    let images: Vec<(PathBuf, OwnedFieldSlice)> = loader::field_loader(p)
        .map(|(file, data)| (file, data.expect("Loading field image error")))
        .collect();
    info!("{} 张射野图像, {} 个工作线程.", images.len(), cpus());

    println!("Running beam checks...");
    let chunk_len = images.len().div_ceil(cpus());
    thread::scope(|s| {
        let handles: Vec<_> = images
            .chunks(chunk_len)
            .map(|chunk| s.spawn(move || check_chunk(chunk, out)))
            .collect();

        CheckResult::from_iter(
            handles
                .into_iter()
                .flat_map(|th| th.join().expect("Thread joining error")),
        )
    })
}

/// 获得可并行核心数.
fn cpus() -> usize {
    std::thread::available_parallelism().map_or_else(|_| num_cpus::get(), usize::from)
}

/// 逐张处理 `chunk` 中的图像.
fn check_chunk(chunk: &[(PathBuf, OwnedFieldSlice)], out_dir: &Path) -> Vec<FieldCheck> {
    chunk
        .iter()
        .map(|(file, field)| check_one(file, field, out_dir))
        .collect()
}

/// 对单张图像运行两类分析, 导出标注图, 记录指标.
fn check_one(file: &Path, field: &OwnedFieldSlice, out_dir: &Path) -> FieldCheck {
    let name = file
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("unnamed")
        .to_owned();
    println!("Checking field `{name}`...");

    let clock = Instant::now();
    let uniformity = analyze_uniformity(field.as_immutable());
    let boundary = central_cross(field.as_immutable().shape());
    let profiles = analyze_profiles(field.as_immutable(), boundary);
    let mut check = FieldCheck::new(name, clock.elapsed());

    match uniformity {
        Ok(u) => {
            check.set_piu(u.piu());
            u.annotated()
                .save(out_dir.join(format!("{}-uniformity.png", check.name())))
                .expect("Saving annotated image error");
        }
        Err(e) => warn!("`{}` 均匀性分析失败: {e:?}", check.name()),
    }

    match profiles {
        Ok(r) => {
            let anomalies = r.horizontal().anomalies().len() + r.vertical().anomalies().len();
            check.set_beam_metrics(
                (r.hor_flatness(), r.hor_symmetry()),
                (r.ver_flatness(), r.ver_symmetry()),
                anomalies,
            );
            r.annotated()
                .save(out_dir.join(format!("{}-profiles.png", check.name())))
                .expect("Saving annotated image error");
        }
        Err(e) => warn!("`{}` 剖线分析失败: {e:?}", check.name()),
    }

    check
}

/// 默认的中心十字剖线: 竖直臂沿中心列从高度的 1/8 延伸到 7/8,
/// 水平臂沿中心行从宽度的 1/8 延伸到 7/8.
fn central_cross((h, w): Idx2d) -> FieldBoundary {
    let (h, w) = (h as f64, w as f64);
    FieldBoundary::new(&[
        (w / 2.0, h / 8.0),
        (w / 2.0, h * 7.0 / 8.0),
        (w / 8.0, h / 2.0),
        (w * 7.0 / 8.0, h / 2.0),
    ])
    .unwrap()
}
