fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    // Generated here rather than with a const fn so the table is only rebuilt when this file changes
    let out_dir = std::env::var_os("OUT_DIR").unwrap();
    let path = std::path::Path::new(&out_dir).join("hex.rs");
    let table = format!("{:?}", generate_nibble_table());
    std::fs::write(&path, format!("pub const INVALID_NIBBLE: u8 = {INVALID_NIBBLE};\npub const HEX_NIBBLE: [u8; u8::MAX as usize + 1] = {table};\n")).unwrap();
}

const INVALID_NIBBLE: u8 = 0xFF;

/// Maps every byte to the value of the hex digit it encodes, or INVALID_NIBBLE
const fn generate_nibble_table() -> [u8; u8::MAX as usize + 1] {
    let mut output = [INVALID_NIBBLE; u8::MAX as usize + 1];
    let mut input: u8 = 0;
    loop {
        output[input as usize] = map_hex_char(input);
        if input == u8::MAX {
            break;
        }
        input += 1;
    }
    output
}

const fn map_hex_char(input: u8) -> u8 {
    match input {
        b'0'..=b'9' => input - b'0',
        b'A'..=b'F' => input - b'A' + 10,
        b'a'..=b'f' => input - b'a' + 10,
        _ => INVALID_NIBBLE,
    }
}
