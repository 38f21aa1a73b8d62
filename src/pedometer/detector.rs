// 步伐检测器过滤
//
// 注册后收到的第一个事件是设备补发的旧事件，需要丢弃

/// 步伐检测器事件过滤器
#[derive(Debug, Clone)]
pub struct StepDetectorFilter {
    ignore_initial: bool,
}

impl Default for StepDetectorFilter {
    fn default() -> Self {
        Self {
            ignore_initial: true,
        }
    }
}

impl StepDetectorFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// 事件是否计为一步
    pub fn accept(&mut self, value: f32) -> bool {
        if self.ignore_initial {
            self.ignore_initial = false;
            return false;
        }
        (value - 1.0).abs() < f32::EPSILON
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_event_is_ignored() {
        let mut filter = StepDetectorFilter::new();
        assert!(!filter.accept(1.0));
        assert!(filter.accept(1.0));
        assert!(filter.accept(1.0));
    }

    #[test]
    fn test_only_unit_values_count() {
        let mut filter = StepDetectorFilter::new();
        filter.accept(1.0);
        assert!(!filter.accept(0.0));
        assert!(!filter.accept(2.0));
        assert!(filter.accept(1.0));
    }
}
