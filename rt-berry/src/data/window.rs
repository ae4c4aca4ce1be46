/// 射野图像显示窗口, 包含窗位 (window level) 和窗宽 (window width).
///
/// 该窗口是只读的. 若要修改窗口参数, 你应该创建新的实例.
#[derive(Copy, Clone, Debug)]
pub struct FieldWindow {
    level: f32,
    width: f32,
}

impl FieldWindow {
    /// 构建显示窗口.
    ///
    /// `level` 和 `width` 必须在合理范围内, 否则返回 `None`.
    pub fn new(level: f32, width: f32) -> Option<FieldWindow> {
        if (-1e5..=1e5).contains(&level) && 0.0 < width && width <= 1e5 {
            Some(Self { level, width })
        } else {
            None
        }
    }

    /// 构建一个便于展示 EPID 射野图像的显示窗口. 该窗口的窗位为
    /// 2048, 窗宽为 4096, 即覆盖常见的 12 位剂量标度,
    /// 同时让均匀性分析烧录的极值掩膜在导出图上清晰可见.
    #[inline]
    pub const fn from_epid_visual() -> FieldWindow {
        Self {
            level: 2048.0,
            width: 4096.0,
        }
    }

    /// 窗下限.
    #[inline]
    pub fn lower_bound(&self) -> f32 {
        self.level - self.width / 2.0
    }

    /// 窗上限.
    #[inline]
    pub fn upper_bound(&self) -> f32 {
        self.level + self.width / 2.0
    }

    /// 窗位.
    #[inline]
    pub fn level(&self) -> f32 {
        self.level
    }

    /// 窗宽.
    #[inline]
    pub fn width(&self) -> f32 {
        self.width
    }

    /// 求在当前窗口设置下, 剂量值 `dose` 对应的灰度图像素整数值 (0 <= value <= 255).
    ///
    /// 如果 `dose` 无意义 (如 inf, NaN), 则返回 `None`.
    pub fn eval(&self, dose: f32) -> Option<u8> {
        if !dose.is_finite() {
            return None;
        }
        let lb = self.lower_bound();
        if dose <= lb {
            Some(u8::MIN)
        } else if dose >= self.upper_bound() {
            Some(u8::MAX)
        } else {
            // 255, not 256.
            Some((((dose - lb) / self.width()) * 255.0) as u8)
        }
    }

    /// 求在当前窗口设置下, 剂量值 `dose` 对应的灰度图像素分布点 (0.0 <= value <= 255.0).
    ///
    /// 如果 `dose` 无意义 (如 inf, NaN), 则返回 `None`.
    pub fn eval_f32(&self, dose: f32) -> Option<f32> {
        if !dose.is_finite() {
            return None;
        }
        let lb = self.lower_bound();
        let ub = self.upper_bound();
        if dose <= lb {
            Some(0.0)
        } else if dose >= ub {
            Some(255.0)
        } else {
            Some((dose - lb) / self.width() * 255.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::FieldWindow;

    fn is_valid_init(level: f32, width: f32) -> bool {
        FieldWindow::new(level, width).is_some()
    }

    #[test]
    fn test_field_window_invalid_input() {
        assert!(!is_valid_init(0.0, -1.0));
        assert!(!is_valid_init(0.0, 0.0));
        assert!(!is_valid_init(2e5, 100.0));
    }

    fn float_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-8
    }

    #[test]
    fn test_field_window_generic() {
        // [0, 400]
        let win = FieldWindow::new(200.0, 400.0).unwrap();
        assert_eq!(win.eval(f32::NAN), None);
        assert_eq!(win.eval(f32::MIN), Some(0));
        assert_eq!(win.eval(f32::MAX), Some(255));

        assert_eq!(win.eval(-10.0), Some(0));
        assert!(float_eq(win.eval_f32(-10.0).unwrap(), 0.0));

        assert_eq!(win.eval(0.0), Some(0));
        assert!(float_eq(win.eval_f32(0.0).unwrap(), 0.0));

        // boundary 1
        assert_eq!(win.eval(0.1), Some(0));
        assert!(win.eval_f32(0.1).unwrap() > 0.0);
        assert!(win.eval_f32(0.1).unwrap() < 1.0);
        // -- boundary 1

        assert_eq!(win.eval(100.0).unwrap(), (255.0 * 0.25) as u8);
        assert!(float_eq(win.eval_f32(100.0).unwrap(), 255.0 * 0.25));

        assert_eq!(win.eval(200.0).unwrap(), (255.0 * 0.5) as u8);
        assert!(float_eq(win.eval_f32(200.0).unwrap(), 255.0 * 0.5));

        assert_eq!(win.eval(300.0).unwrap(), (255.0 * 0.75) as u8);
        assert!(float_eq(win.eval_f32(300.0).unwrap(), 255.0 * 0.75));

        // boundary 2
        assert_eq!(win.eval(399.99), Some(254));
        assert!(win.eval_f32(399.99).unwrap() < 255.0);
        assert!(win.eval_f32(399.99).unwrap() > 254.0);
        // -- boundary 2

        assert_eq!(win.eval(400.0).unwrap(), u8::MAX);
        assert!(float_eq(win.eval_f32(400.0).unwrap(), 255.0));
    }
}
