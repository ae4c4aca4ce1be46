//! 射野图像批量质控: 对一个目录下的所有射野图像运行均匀性与剖线分析,
//! 导出标注图并打印汇总报告.

mod loader;
mod report;
mod runner;

fn main() {
    simple_logger::SimpleLogger::new()
        .with_level(log::LevelFilter::Info)
        .env()
        .init()
        .unwrap();

    let result = runner::run();
    result.analyze();
}
