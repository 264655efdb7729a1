use boxit_types::ResultBox;

fn main() {
    let boxed = ResultBox::success(3);
    let value: i32 = boxed.value;
    println!("{value}");
}
