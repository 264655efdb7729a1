use boxit_core::{Deferred, boxify};

fn main() {
    let later = boxify(|| Deferred::new(async { Ok::<u8, String>(1) }));
    let _ = later.call(());
}
