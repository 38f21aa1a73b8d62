// Tree 计步应用入口
fn main() {
    tree_lib::run()
}
