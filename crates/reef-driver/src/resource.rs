//! 执行器资源标识
//!
//! 单一所有者规则：每个资源在同一时刻最多被一个活动动作持有。
//! 新请求占用已被持有的资源时，当前持有者在同一 tick 内被中断。

use bitflags::bitflags;

bitflags! {
    /// 执行器资源集合
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ResourceSet: u8 {
        /// 升降机构
        const LIFT = 0b0_0001;
        /// 摆臂
        const ARM = 0b0_0010;
        /// 夹爪
        const GRABBER = 0b0_0100;
        /// 爬升机构
        const CLIMB = 0b0_1000;
        /// 移动底盘
        const BASE = 0b1_0000;
    }
}

impl ResourceSet {
    /// 资源名称列表（用于日志）
    pub fn names(self) -> Vec<&'static str> {
        self.iter_names().map(|(name, _)| name).collect()
    }

    /// 是否与另一集合有交集
    #[inline]
    pub fn conflicts_with(self, other: ResourceSet) -> bool {
        self.intersects(other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflicts() {
        let superstructure = ResourceSet::LIFT | ResourceSet::ARM;
        assert!(superstructure.conflicts_with(ResourceSet::ARM));
        assert!(!superstructure.conflicts_with(ResourceSet::GRABBER | ResourceSet::BASE));
        assert!(!ResourceSet::empty().conflicts_with(ResourceSet::all()));
    }

    #[test]
    fn test_names() {
        let set = ResourceSet::GRABBER | ResourceSet::LIFT;
        assert_eq!(set.names(), vec!["LIFT", "GRABBER"]);
    }
}
