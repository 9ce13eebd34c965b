//! Event dispatch.

use crate::event::Event;

/// Implemented by every simulation component that wants to receive events.
pub trait EventHandler {
    /// Handles a single delivered event.
    fn on(&mut self, event: Event);
}

/// Pattern-matches an [`Event`]'s boxed payload against a closed set of concrete types.
///
/// Unmatched events are logged and dropped rather than panicking, since an unexpected event
/// almost always means a scheduling bug elsewhere in the kernel, not a condition the handler
/// itself should crash on.
#[macro_export]
macro_rules! cast {
    ( match $event:ident.data { $( $type:ident { $($tt:tt)* } => { $($expr:tt)* } )+ } ) => {
        $(
            if $event.data.is::<$type>() {
                let $type { $($tt)* } = *$event.data.downcast::<$type>().unwrap();
                $($expr)*
            } else
        )*
        {
            $crate::log::log_unhandled_event($event)
        }
    }
}
