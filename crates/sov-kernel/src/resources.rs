use serde::{Deserialize, Serialize};

/// Current consumption of a [`ResourceBudget`].
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResourceUsage {
    pub cpu: u64,
    pub memory: u64,
}

/// Bounded cpu/memory counters.
///
/// `usage` never exceeds capacity in either dimension: [`consume`](Self::consume)
/// checks both dimensions before touching either, and [`release`](Self::release)
/// clamps at zero.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResourceBudget {
    cpu: u64,
    memory: u64,
    usage: ResourceUsage,
}

impl ResourceBudget {
    pub fn new(cpu: u64, memory: u64) -> Self {
        Self {
            cpu,
            memory,
            usage: ResourceUsage::default(),
        }
    }

    pub fn cpu_capacity(&self) -> u64 {
        self.cpu
    }

    pub fn memory_capacity(&self) -> u64 {
        self.memory
    }

    /// Reserve `cpu` and `memory` together. Returns `false` and leaves usage
    /// untouched if either dimension would go over capacity.
    pub fn consume(&mut self, cpu: u64, memory: u64) -> bool {
        let Some(next_cpu) = self.usage.cpu.checked_add(cpu) else {
            return false;
        };
        let Some(next_memory) = self.usage.memory.checked_add(memory) else {
            return false;
        };
        if next_cpu > self.cpu || next_memory > self.memory {
            log::debug!(
                "budget rejected cpu+{cpu} memory+{memory} (usage {}/{}, {}/{})",
                self.usage.cpu,
                self.cpu,
                self.usage.memory,
                self.memory
            );
            return false;
        }
        self.usage = ResourceUsage {
            cpu: next_cpu,
            memory: next_memory,
        };
        true
    }

    pub fn release(&mut self, cpu: u64, memory: u64) {
        self.usage.cpu = self.usage.cpu.saturating_sub(cpu);
        self.usage.memory = self.usage.memory.saturating_sub(memory);
    }

    pub fn snapshot(&self) -> ResourceUsage {
        self.usage
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejected_consume_leaves_usage_untouched() {
        let mut budget = ResourceBudget::new(4, 8);
        assert!(budget.consume(2, 4));
        assert!(!budget.consume(3, 0));
        assert_eq!(budget.snapshot(), ResourceUsage { cpu: 2, memory: 4 });
    }

    #[test]
    fn rejection_in_one_dimension_blocks_the_other() {
        let mut budget = ResourceBudget::new(4, 8);
        assert!(!budget.consume(1, 9));
        assert_eq!(budget.snapshot(), ResourceUsage::default());
        assert!(budget.consume(4, 8));
        assert!(!budget.consume(0, 1));
    }

    #[test]
    fn release_clamps_at_zero() {
        let mut budget = ResourceBudget::new(4, 8);
        assert!(budget.consume(1, 2));
        budget.release(5, 1);
        assert_eq!(budget.snapshot(), ResourceUsage { cpu: 0, memory: 1 });
    }

    #[test]
    fn overflowing_request_is_rejected() {
        let mut budget = ResourceBudget::new(u64::MAX, u64::MAX);
        assert!(budget.consume(u64::MAX, 1));
        assert!(!budget.consume(1, 0));
        assert_eq!(budget.snapshot().cpu, u64::MAX);
    }
}
