use rand::Rng;

pub const ROOM_CODE_LEN: usize = 4;
const ROOM_CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Random four letter code. Collisions with live rooms are not checked.
pub fn generate_room_code() -> String {
    let mut rng = rand::thread_rng();
    (0..ROOM_CODE_LEN)
        .map(|_| ROOM_CODE_ALPHABET[rng.gen_range(0..ROOM_CODE_ALPHABET.len())] as char)
        .collect()
}

/// Uses the operator override when it has any content, otherwise generates one.
pub fn resolve_room_code(forced: Option<&str>) -> String {
    match forced.map(str::trim).filter(|code| !code.is_empty()) {
        Some(code) => code.to_uppercase(),
        None => generate_room_code(),
    }
}
