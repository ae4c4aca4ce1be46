//! 质控结果汇总.

use std::io::{self, Write};
use std::time::Duration;

/// 单张射野图像的质控记录.
pub struct FieldCheck {
    name: String,
    piu: Option<f64>,
    hor: Option<(f64, f64)>,
    ver: Option<(f64, f64)>,
    anomalies: usize,
    elapsed: Duration,
}

impl FieldCheck {
    /// 初始化一条质控记录. 各项指标都从 "缺失" 开始.
    pub fn new(name: String, elapsed: Duration) -> Self {
        Self {
            name,
            piu: None,
            hor: None,
            ver: None,
            anomalies: 0,
            elapsed,
        }
    }

    /// 图像名 (不含扩展名).
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 记录 PIU.
    #[inline]
    pub fn set_piu(&mut self, piu: f64) {
        self.piu = Some(piu);
    }

    /// 记录两轴的 (平坦度, 对称性) 与异常总数.
    pub fn set_beam_metrics(&mut self, hor: (f64, f64), ver: (f64, f64), anomalies: usize) {
        self.hor = Some(hor);
        self.ver = Some(ver);
        self.anomalies = anomalies;
    }

    #[inline]
    fn elapsed_us(&self) -> u64 {
        self.elapsed.as_micros() as u64
    }
}

/// 将一条质控记录的结果写进 `w` 中.
fn describe_into<W: Write>(p: &FieldCheck, w: &mut W) -> io::Result<()> {
    const S4: &str = "    ";

    #[inline]
    fn f64_to_display(f: Option<f64>) -> String {
        match f {
            Some(f) => format!("{f:.6}"),
            None => "/".to_string(),
        }
    }

    writeln!(w, "Field `{}`:", p.name())?;
    writeln!(w, "{S4}PIU: {}", f64_to_display(p.piu))?;
    writeln!(
        w,
        "{S4}Horizontal flatness: {} %",
        f64_to_display(p.hor.map(|v| v.0))
    )?;
    writeln!(
        w,
        "{S4}Horizontal symmetry: {} %",
        f64_to_display(p.hor.map(|v| v.1))
    )?;
    writeln!(
        w,
        "{S4}Vertical flatness: {} %",
        f64_to_display(p.ver.map(|v| v.0))
    )?;
    writeln!(
        w,
        "{S4}Vertical symmetry: {} %",
        f64_to_display(p.ver.map(|v| v.1))
    )?;
    writeln!(w, "{S4}Anomalies: {}", p.anomalies)?;
    write!(w, "{S4}Analysis time: {} us", p.elapsed_us())?;
    Ok(())
}

const SEP: &str = "--------------------------------------------------------";

/// 简单分隔线.
#[inline]
fn sep() {
    println!("{SEP}");
}

/// 批量质控最终结果.
pub struct CheckResult {
    data: Vec<FieldCheck>,
}

impl CheckResult {
    pub fn from_iter<I: IntoIterator<Item = FieldCheck>>(it: I) -> Self {
        Self {
            data: it.into_iter().collect(),
        }
    }

    /// 分析运行结果.
    pub fn analyze(&self) {
        sep();
        let mut buf = Vec::with_capacity(512);

        for check in self.data.iter() {
            describe_into(check, &mut buf).unwrap();
            println!("{}", std::str::from_utf8(&buf).unwrap());
            buf.clear();

            sep();
        }

        self.summarize();
        sep();
    }

    /// 打印批量汇总: 图像数, 总耗时, 异常图像数, 最耗时条目.
    fn summarize(&self) {
        let total_us: u64 = self.data.iter().map(|c| c.elapsed_us()).sum();
        let with_anomalies = self.data.iter().filter(|c| c.anomalies > 0).count();

        println!("Checked {} field images in {total_us} us", self.data.len());
        println!("    Images with anomalies: {with_anomalies}");
        if let Some(worst) = self.data.iter().max_by_key(|c| c.elapsed_us()) {
            println!(
                "    Most time-consuming image `{}` costs {} us",
                worst.name(),
                worst.elapsed_us()
            );
        }
    }
}
