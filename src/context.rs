//! Ambient "current value" slots for the active compilation.
//!
//! Deeply nested parsing and analysis code needs to know things like "which
//! file am I in" without threading a parameter through every call. A context
//! slot holds a thread-local stack of values; [`scope`][`context_slot!`]
//! pushes a value for the duration of a closure and restores the previous one
//! on every exit path, including unwinding. Nested scopes (e.g. entering an
//! included file) therefore compose with stack discipline.
//!
//! Slots are single-threaded by design: each thread sees its own stack, so
//! concurrent compilations on separate threads are isolated from each other
//! with no synchronization.

/// Declares a context slot: a named, thread-local stack of `T` with scoped
/// override.
///
/// ```
/// torque::context_slot! {
///     /// Nesting depth of the construct being parsed.
///     pub CurrentDepth: u32
/// }
///
/// CurrentDepth::scope(0, || {
///     assert_eq!(CurrentDepth::current(), 0);
///     CurrentDepth::scope(1, || assert_eq!(CurrentDepth::current(), 1));
///     assert_eq!(CurrentDepth::current(), 0);
/// });
/// ```
///
/// The declared type is uninhabited; it exists only as a namespace for the
/// slot's operations. `current`, `set`, `with` and `with_mut` panic if no
/// scope is active — an unset slot is a contract violation by the caller, not
/// a recoverable condition. The callback passed to `with`/`with_mut` must not
/// re-enter the same slot, as the value is borrowed for its duration.
#[macro_export]
macro_rules! context_slot {
    (
        $(#[$attr:meta])*
        $vis:vis $Name:ident: $T:ty
    ) => {
        $(#[$attr])*
        $vis enum $Name {}

        // not every slot uses the full generated surface
        #[allow(dead_code)]
        impl $Name {
            fn stack() -> &'static ::std::thread::LocalKey<::std::cell::RefCell<::std::vec::Vec<$T>>> {
                ::std::thread_local! {
                    static STACK: ::std::cell::RefCell<::std::vec::Vec<$T>> =
                        ::std::cell::RefCell::new(::std::vec::Vec::new());
                }
                &STACK
            }

            /// Runs `f` with `value` as the active value of this slot.
            ///
            /// The previous value, if any, becomes active again when `f`
            /// exits, whether it returns normally or unwinds.
            $vis fn scope<R>(value: $T, f: impl ::std::ops::FnOnce() -> R) -> R {
                struct Guard;
                impl ::std::ops::Drop for Guard {
                    fn drop(&mut self) {
                        $Name::stack().with(|stack| { stack.borrow_mut().pop(); });
                    }
                }

                Self::stack().with(|stack| stack.borrow_mut().push(value));
                let _guard = Guard;
                f()
            }

            /// Returns a copy of the active value.
            ///
            /// # Panics
            /// Panics if no scope is active.
            $vis fn current() -> $T
            where
                $T: ::std::clone::Clone,
            {
                Self::with(<$T as ::std::clone::Clone>::clone)
            }

            /// Replaces the active value in place, without pushing a scope.
            ///
            /// This is how the parser advances the current value as it works
            /// through a file; the enclosing scope still restores whatever
            /// was active before it.
            ///
            /// # Panics
            /// Panics if no scope is active.
            $vis fn set(value: $T) {
                Self::with_mut(|active| *active = value);
            }

            /// Calls `f` with a shared borrow of the active value.
            ///
            /// # Panics
            /// Panics if no scope is active.
            $vis fn with<R>(f: impl ::std::ops::FnOnce(&$T) -> R) -> R {
                Self::stack().with(|stack| match stack.borrow().last() {
                    ::std::option::Option::Some(active) => f(active),
                    ::std::option::Option::None => ::std::panic!(
                        concat!("no ", stringify!($Name), " scope is active"),
                    ),
                })
            }

            /// Calls `f` with a mutable borrow of the active value.
            ///
            /// # Panics
            /// Panics if no scope is active.
            $vis fn with_mut<R>(f: impl ::std::ops::FnOnce(&mut $T) -> R) -> R {
                Self::stack().with(|stack| match stack.borrow_mut().last_mut() {
                    ::std::option::Option::Some(active) => f(active),
                    ::std::option::Option::None => ::std::panic!(
                        concat!("no ", stringify!($Name), " scope is active"),
                    ),
                })
            }

            /// Whether any scope is active on this thread.
            $vis fn is_set() -> bool {
                Self::stack().with(|stack| !stack.borrow().is_empty())
            }
        }
    };
}
