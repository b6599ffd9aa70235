/// One toast display object. Reused across toasts once it has been hidden.
pub trait ToastView {
    fn show(&mut self, content: &str);

    /// Starts the out-transition and returns its length in seconds.
    fn play_out(&mut self) -> f32;

    fn hide(&mut self);
}

pub trait ToastFactory {
    fn create(&mut self) -> Box<dyn ToastView>;
}

impl<F> ToastFactory for F
where
    F: FnMut() -> Box<dyn ToastView>,
{
    fn create(&mut self) -> Box<dyn ToastView> {
        self()
    }
}
