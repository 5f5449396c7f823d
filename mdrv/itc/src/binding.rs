//! Static source to handler binding

use crate::controller::SecondLevelController;
use crate::source::Source;

/// Interrupt handler
///
/// A handler gets the controller so it can acknowledge its source, and the
/// application context it was registered with. A handler that does not
/// acknowledge its source is re-entered until it does.
pub type Handler<R, C> = fn(&mut SecondLevelController<R>, &mut C);

/// Default handler for sources without a binding
pub fn unbound<R, C>(_: &mut SecondLevelController<R>, _: &mut C) {}

/// One source bound to one handler
pub struct Binding<R: 'static, C: 'static> {
    /// Bound source
    pub source: Source,
    /// Handler invoked when the source is served
    pub handler: Handler<R, C>,
}

impl<R, C> Binding<R, C> {
    /// Bind `handler` to `source`
    pub const fn new(source: Source, handler: Handler<R, C>) -> Self {
        Self { source, handler }
    }
}

/// Build-time binding table
///
/// Construct it in a `static` so the one-to-one check runs at compile time:
///
/// ```ignore
/// static BINDINGS: BindingTable<Regs, App> = BindingTable::new(&[
///     Binding::new(Source::PWMA, on_pwm_period),
///     Binding::new(Source::OVER_TEMP, on_over_temperature),
/// ]);
/// ```
pub struct BindingTable<R: 'static, C: 'static> {
    bindings: &'static [Binding<R, C>],
    default: Handler<R, C>,
}

impl<R, C> BindingTable<R, C> {
    /// Table falling back to [`unbound`]
    pub const fn new(bindings: &'static [Binding<R, C>]) -> Self {
        Self::with_default(bindings, unbound::<R, C>)
    }

    /// Table with an explicit fallback handler
    ///
    /// # Panics
    /// If a source is bound twice.
    pub const fn with_default(bindings: &'static [Binding<R, C>], default: Handler<R, C>) -> Self {
        let mut i = 0;
        while i < bindings.len() {
            let mut j = i + 1;
            while j < bindings.len() {
                if bindings[i].source.same_as(bindings[j].source) {
                    panic!("interrupt source bound twice");
                }
                j += 1;
            }
            i += 1;
        }
        Self { bindings, default }
    }

    /// Handler bound to `source`, or the fallback
    pub fn handler(&self, source: Source) -> Handler<R, C> {
        self.bindings
            .iter()
            .find(|b| b.source == source)
            .map_or(self.default, |b| b.handler)
    }

    /// Check if `source` has its own handler
    pub fn is_bound(&self, source: Source) -> bool {
        self.bindings.iter().any(|b| b.source == source)
    }

    /// Number of bindings
    pub const fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Check if the table binds nothing
    pub const fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
