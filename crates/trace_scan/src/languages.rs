use failure_signals::patterns::builtin_packs;

pub fn run() {
    for pack in builtin_packs() {
        println!("{}\t{}", pack.code, pack.name);
    }
}
