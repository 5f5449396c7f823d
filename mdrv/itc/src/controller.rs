//! Second-level interrupt controller

use mdrv_hal::interrupt::IrqGroupRegisters;

use crate::binding::BindingTable;
use crate::group::SourceGroup;
use crate::source::{Group, Source};

/// Five source groups behind the first-level vectors
pub struct SecondLevelController<R> {
    groups: [SourceGroup<R>; Group::COUNT],
}

impl<R: IrqGroupRegisters> SecondLevelController<R> {
    /// Take the group registers in [`Group::ALL`] order
    pub fn new(regs: [R; Group::COUNT]) -> Self {
        let [pwm, timer1, timer2, extio, diag] = regs;
        Self {
            groups: [
                SourceGroup::new(Group::Pwm, pwm),
                SourceGroup::new(Group::Timer1, timer1),
                SourceGroup::new(Group::Timer2, timer2),
                SourceGroup::new(Group::ExtIo, extio),
                SourceGroup::new(Group::Diagnostic, diag),
            ],
        }
    }

    /// Mask and clear every source
    ///
    /// Must run before any source is enabled.
    pub fn init(&mut self) {
        for group in self.groups.iter_mut() {
            group.reset();
        }
        debug!("second-level interrupts reset");
    }

    /// Registers of one group
    pub fn group(&self, group: Group) -> &SourceGroup<R> {
        &self.groups[group.index()]
    }

    fn group_mut(&mut self, group: Group) -> &mut SourceGroup<R> {
        &mut self.groups[group.index()]
    }

    /// Latch and unmask a source
    pub fn enable(&mut self, source: Source) {
        trace!("enable {}", source);
        self.group_mut(source.group()).enable(source.mask());
    }

    /// Mask a source; a latched condition stays pending
    pub fn disable(&mut self, source: Source) {
        trace!("disable {}", source);
        self.group_mut(source.group()).disable(source.mask());
    }

    /// Clear the pending condition of a source
    pub fn acknowledge(&mut self, source: Source) {
        self.group_mut(source.group()).acknowledge(source.mask());
    }

    /// Check if the source is unmasked
    pub fn is_enabled(&self, source: Source) -> bool {
        self.group(source.group()).mask() & source.mask() != 0
    }

    /// Check if the source is latched
    pub fn is_pending(&self, source: Source) -> bool {
        self.group(source.group()).pending() & source.mask() != 0
    }

    /// Serve the lowest active source of `group`
    ///
    /// Returns the source served, or `None` when nothing is active.
    pub fn dispatch_once<C>(
        &mut self,
        group: Group,
        table: &BindingTable<R, C>,
        cx: &mut C,
    ) -> Option<Source> {
        let bit = self.group(group).lowest_active()?;
        let source = Source::wired(group, bit);
        trace!("serve {}", source);
        let handler = table.handler(source);
        handler(self, cx);
        Some(source)
    }

    /// Serve `group` until no source is active
    ///
    /// Sources are served lowest bit first. Returns how many handlers ran.
    pub fn dispatch<C>(&mut self, group: Group, table: &BindingTable<R, C>, cx: &mut C) -> usize {
        let mut served = 0;
        while self.dispatch_once(group, table, cx).is_some() {
            served += 1;
        }
        served
    }
}
