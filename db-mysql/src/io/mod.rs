mod buf_ext;
mod buf_mut_ext;

pub use buf_ext::BufExt;
pub use buf_mut_ext::BufMutExt;
