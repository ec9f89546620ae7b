//! Arity-independent calling of closures with tuple arguments, and binding of a fixed leading argument.

/// A closure that can be called with its arguments packed into a tuple.
///
/// Implemented for every `Fn(A1, .., An) -> R + Send + Sync + 'static` with up to eight arguments.
pub trait Callable<Args, R>: Send + Sync + 'static {
    fn invoke(&self, args: Args) -> R;
}

/// A closure whose first parameter is a borrowed `First`, followed by the tuple `Args`.
///
/// Implemented for every `Fn(&First, A1, .., An) -> R + Send + Sync + 'static` with up to eight trailing arguments.
pub trait BindFront<First: ?Sized, Args, R>: Send + Sync + 'static {
    fn invoke_with(&self, first: &First, args: Args) -> R;
}

macro_rules! impl_callable {
    ($($ty:ident $var:ident),*) => {
        impl<Func, Ret, $($ty,)*> Callable<($($ty,)*), Ret> for Func
        where Func: Fn($($ty),*) -> Ret + Send + Sync + 'static
        {
            fn invoke(&self, ($($var,)*): ($($ty,)*)) -> Ret { self($($var),*) }
        }

        impl<Func, Ret, First: ?Sized, $($ty,)*> BindFront<First, ($($ty,)*), Ret> for Func
        where Func: Fn(&First, $($ty),*) -> Ret + Send + Sync + 'static
        {
            fn invoke_with(&self, first: &First, ($($var,)*): ($($ty,)*)) -> Ret { self(first, $($var),*) }
        }
    };
}

impl_callable!();
impl_callable!(A1 a1);
impl_callable!(A1 a1, A2 a2);
impl_callable!(A1 a1, A2 a2, A3 a3);
impl_callable!(A1 a1, A2 a2, A3 a3, A4 a4);
impl_callable!(A1 a1, A2 a2, A3 a3, A4 a4, A5 a5);
impl_callable!(A1 a1, A2 a2, A3 a3, A4 a4, A5 a5, A6 a6);
impl_callable!(A1 a1, A2 a2, A3 a3, A4 a4, A5 a5, A6 a6, A7 a7);
impl_callable!(A1 a1, A2 a2, A3 a3, A4 a4, A5 a5, A6 a6, A7 a7, A8 a8);

/// Fix `first` as the leading argument of `f`, producing a closure over the remaining arguments.
///
/// The remaining arguments are forwarded unchanged, whatever their number.
pub fn bind_front<First, Args, R, F>(first: First, f: F) -> impl Fn(Args) -> R + Send + Sync + 'static
where
    First: Send + Sync + 'static,
    Args: 'static,
    R: 'static,
    F: BindFront<First, Args, R>,
{
    move |args| f.invoke_with(&first, args)
}
