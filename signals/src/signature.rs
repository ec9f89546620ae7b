/// The call signature of a signal, written as a function pointer type.
///
/// `fn(i32, f64) -> char` describes a signal invoked with an `i32` and an `f64` whose slots each return a `char`.
/// Arguments are carried as a tuple so that every slot of one invocation can receive its own clone.
pub trait Signature: 'static {
    /// Tuple of the call arguments, `()` for a signal without arguments
    type Args: Clone + 'static;
    /// Return type of each individual slot
    type Output: 'static;
    /// Number of call arguments
    const ARITY: usize;
}

macro_rules! count {
    () => { 0 };
    ($head:ident $($tail:ident)*) => { 1 + count!($($tail)*) };
}

macro_rules! impl_signature {
    ($($ty:ident),*) => {
        impl<Ret, $($ty,)*> Signature for fn($($ty),*) -> Ret
        where
            Ret: 'static,
            $($ty: Clone + 'static,)*
        {
            type Args = ($($ty,)*);
            type Output = Ret;
            const ARITY: usize = count!($($ty)*);
        }
    };
}

impl_signature!();
impl_signature!(A1);
impl_signature!(A1, A2);
impl_signature!(A1, A2, A3);
impl_signature!(A1, A2, A3, A4);
impl_signature!(A1, A2, A3, A4, A5);
impl_signature!(A1, A2, A3, A4, A5, A6);
impl_signature!(A1, A2, A3, A4, A5, A6, A7);
impl_signature!(A1, A2, A3, A4, A5, A6, A7, A8);
