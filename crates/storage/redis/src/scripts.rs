/// Lua script for atomically storing a message hash and arming its TTL.
///
/// KEYS\[1\] = the message key
/// ARGV\[1\] = payload bytes
/// ARGV\[2\] = creation time, UNIX seconds
/// ARGV\[3\] = filename (may be empty)
/// ARGV\[4\] = content type (may be empty)
/// ARGV\[5\] = TTL in milliseconds
///
/// Running both commands in one script closes the window where a crash
/// between HSET and PEXPIRE would leave an immortal entry.
pub const SET_MESSAGE: &str = r"
redis.call('HSET', KEYS[1],
    'data', ARGV[1],
    'created', ARGV[2],
    'filename', ARGV[3],
    'content-type', ARGV[4])
redis.call('PEXPIRE', KEYS[1], ARGV[5])
return 1
";

/// Lua script for atomically fetching a message hash and deleting the key.
///
/// KEYS\[1\] = the message key
///
/// Returns the flat HGETALL field/value array, or false when the key does
/// not exist. Fetch and delete run as one step, so concurrent readers race
/// for exactly one winner.
pub const TAKE_MESSAGE: &str = r"
local fields = redis.call('HGETALL', KEYS[1])
if #fields == 0 then
    return false
end
redis.call('DEL', KEYS[1])
return fields
";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scripts_cover_all_hash_fields() {
        for field in ["data", "created", "filename", "content-type"] {
            assert!(SET_MESSAGE.contains(field), "SET_MESSAGE missing {field}");
        }
        assert!(SET_MESSAGE.contains("PEXPIRE"));
        assert!(TAKE_MESSAGE.contains("HGETALL"));
        assert!(TAKE_MESSAGE.contains("DEL"));
    }
}
