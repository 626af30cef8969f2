/// Implemented by anything that subscribes to a channel while holding an `Rc` back to
/// itself; the cycle is only broken by calling `destroy`.
pub trait Destroyable {
    fn destroy(&mut self);
}
