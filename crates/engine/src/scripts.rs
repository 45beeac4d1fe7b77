//! Server-side Lua scripts.
//!
//! Every script takes `KEYS[1] = seats:{showtime_id}` and, where it touches
//! the counter, `KEYS[2] = available:{showtime_id}`. Timestamps are read from
//! the store's own clock (`redis.call('TIME')`) so hold-deadline comparisons
//! stay monotone within one store regardless of caller clock skew.
//!
//! List-valued result fields are only set when non-empty; the Rust side
//! deserializes them with `#[serde(default)]`. That sidesteps cjson encoding
//! an empty Lua table as `{}` instead of `[]`.

/// A named script plus its source text. SHAs are cached by name at load time.
#[derive(Debug, Clone, Copy)]
pub struct ScriptDef {
    pub name: &'static str,
    pub text: &'static str,
}

/// All-or-nothing batch reserve.
///
/// `ARGV[1]` booking id, `ARGV[2]` hold duration in seconds (the expiry is
/// computed here, on the store clock), `ARGV[3..]` alternating
/// seat id / seat type pairs.
pub const BATCH_RESERVE: ScriptDef = ScriptDef {
    name: "batch_reserve",
    text: r#"
local booking_id = ARGV[1]
local hold_seconds = tonumber(ARGV[2])
local now = tonumber(redis.call('TIME')[1])
local expires_at = now + hold_seconds

local unavailable = {}
local plan = {}
local from_available = 0

for i = 3, #ARGV, 2 do
  local seat_id = ARGV[i]
  local seat_type = ARGV[i + 1]
  local raw = redis.call('HGET', KEYS[1], seat_id)
  if not raw then
    table.insert(unavailable, { seat_id = seat_id, reason = 'NOT_FOUND' })
  else
    local seat = cjson.decode(raw)
    if seat.status == 'booked' then
      table.insert(unavailable, { seat_id = seat_id, reason = 'BOOKED' })
    elseif seat.status == 'held' and seat.booking_id ~= booking_id
        and tonumber(seat.held_until or 0) > now then
      table.insert(unavailable, { seat_id = seat_id, reason = 'HELD' })
    else
      -- reservable: available, expired hold, or re-hold by the same booking
      if seat.status == 'available' then
        from_available = from_available + 1
      end
      table.insert(plan, { seat_id = seat_id, seat_type = seat_type })
    end
  end
end

if #unavailable > 0 then
  return cjson.encode({ success = false, unavailable = unavailable })
end

for _, entry in ipairs(plan) do
  local record = {
    status = 'held',
    seat_type = entry.seat_type,
    booking_id = booking_id,
    held_until = expires_at,
    reserved_at = now,
  }
  redis.call('HSET', KEYS[1], entry.seat_id, cjson.encode(record))
end

-- expired holds were never counted back into the pool, so only seats that
-- were 'available' move the counter
if from_available > 0 then
  redis.call('DECRBY', KEYS[2], from_available)
end

return cjson.encode({ success = true, reserved = #plan, expires_at = expires_at })
"#,
};

/// Per-seat confirm; never rolls back seats confirmed earlier in the call.
///
/// `ARGV[1]` booking id, `ARGV[2..]` seat ids.
pub const CONFIRM_SEATS: ScriptDef = ScriptDef {
    name: "confirm_seats",
    text: r#"
local booking_id = ARGV[1]
local now = tonumber(redis.call('TIME')[1])
local confirmed = {}
local failed = {}

for i = 2, #ARGV do
  local seat_id = ARGV[i]
  local raw = redis.call('HGET', KEYS[1], seat_id)
  if not raw then
    table.insert(failed, { seat_id = seat_id, reason = 'NOT_FOUND' })
  else
    local seat = cjson.decode(raw)
    if seat.status ~= 'held' then
      table.insert(failed, { seat_id = seat_id, reason = 'NOT_HELD' })
    elseif seat.booking_id ~= booking_id then
      table.insert(failed, { seat_id = seat_id, reason = 'WRONG_BOOKING' })
    elseif tonumber(seat.held_until or 0) <= now then
      table.insert(failed, { seat_id = seat_id, reason = 'HOLD_EXPIRED' })
    else
      seat.status = 'booked'
      seat.held_until = nil
      seat.confirmed_at = now
      redis.call('HSET', KEYS[1], seat_id, cjson.encode(seat))
      table.insert(confirmed, seat_id)
    end
  end
end

local result = { requested = #ARGV - 1 }
if #confirmed > 0 then result.confirmed = confirmed end
if #failed > 0 then result.failed = failed end
return cjson.encode(result)
"#,
};

/// Release every seat carrying this booking id, held or booked.
///
/// `ARGV[1]` booking id, `ARGV[2..]` seat ids.
pub const RELEASE_SEATS: ScriptDef = ScriptDef {
    name: "release_seats",
    text: r#"
local booking_id = ARGV[1]
local now = tonumber(redis.call('TIME')[1])
local released = 0
local failed = {}

for i = 2, #ARGV do
  local seat_id = ARGV[i]
  local raw = redis.call('HGET', KEYS[1], seat_id)
  if not raw then
    table.insert(failed, { seat_id = seat_id, reason = 'NOT_FOUND' })
  else
    local seat = cjson.decode(raw)
    if seat.booking_id ~= booking_id then
      table.insert(failed, { seat_id = seat_id, reason = 'WRONG_BOOKING' })
    else
      local record = {
        status = 'available',
        seat_type = seat.seat_type,
        released_at = now,
        previous_booking = booking_id,
      }
      redis.call('HSET', KEYS[1], seat_id, cjson.encode(record))
      released = released + 1
    end
  end
end

if released > 0 then
  redis.call('INCRBY', KEYS[2], released)
end

local result = { released = released }
if #failed > 0 then result.failed = failed end
return cjson.encode(result)
"#,
};

/// Full-map sweep returning every expired hold to the pool.
pub const CLEANUP_EXPIRED: ScriptDef = ScriptDef {
    name: "cleanup_expired",
    text: r#"
local now = tonumber(redis.call('TIME')[1])
local entries = redis.call('HGETALL', KEYS[1])
local cleaned = {}

for i = 1, #entries, 2 do
  local seat_id = entries[i]
  local seat = cjson.decode(entries[i + 1])
  if seat.status == 'held' and tonumber(seat.held_until or 0) < now then
    local record = {
      status = 'available',
      seat_type = seat.seat_type,
      released_at = now,
      released_reason = 'HOLD_EXPIRED',
      previous_booking = seat.booking_id,
    }
    redis.call('HSET', KEYS[1], seat_id, cjson.encode(record))
    table.insert(cleaned, seat_id)
  end
end

if #cleaned > 0 then
  redis.call('INCRBY', KEYS[2], #cleaned)
end

local result = { cleaned = #cleaned }
if #cleaned > 0 then result.seats = cleaned end
return cjson.encode(result)
"#,
};

/// Read seat state. Reaps expired holds first so callers never observe a
/// stale hold, then reports `remaining_seconds` for live ones.
///
/// `ARGV` is the seat id filter; empty means the whole map.
pub const SEATS_STATUS: ScriptDef = ScriptDef {
    name: "seats_status",
    text: r#"
local now = tonumber(redis.call('TIME')[1])

local entries = redis.call('HGETALL', KEYS[1])
local reaped = 0
for i = 1, #entries, 2 do
  local seat = cjson.decode(entries[i + 1])
  if seat.status == 'held' and tonumber(seat.held_until or 0) < now then
    local record = {
      status = 'available',
      seat_type = seat.seat_type,
      released_at = now,
      released_reason = 'HOLD_EXPIRED',
      previous_booking = seat.booking_id,
    }
    redis.call('HSET', KEYS[1], entries[i], cjson.encode(record))
    reaped = reaped + 1
  end
end
if reaped > 0 then
  redis.call('INCRBY', KEYS[2], reaped)
end

local seats = {}
local function describe(seat_id, raw)
  if not raw then return end
  local seat = cjson.decode(raw)
  local entry = { seat_id = seat_id, status = seat.status, seat_type = seat.seat_type }
  if seat.booking_id then entry.booking_id = seat.booking_id end
  if seat.status == 'held' then
    entry.remaining_seconds = tonumber(seat.held_until) - now
  end
  table.insert(seats, entry)
end

if #ARGV > 0 then
  for i = 1, #ARGV do
    describe(ARGV[i], redis.call('HGET', KEYS[1], ARGV[i]))
  end
else
  local all = redis.call('HGETALL', KEYS[1])
  for i = 1, #all, 2 do
    describe(all[i], all[i + 1])
  end
end

local available = tonumber(redis.call('GET', KEYS[2]) or '0')
local result = { available = available }
if #seats > 0 then result.seats = seats end
return cjson.encode(result)
"#,
};

/// Push the deadline of live holds owned by this booking. Expired holds are
/// never revived.
///
/// `ARGV[1]` booking id, `ARGV[2]` additional seconds, `ARGV[3..]` seat ids.
pub const EXTEND_HOLD: ScriptDef = ScriptDef {
    name: "extend_hold",
    text: r#"
local booking_id = ARGV[1]
local add = tonumber(ARGV[2])
local now = tonumber(redis.call('TIME')[1])
local extended = 0
local deadline = 0

for i = 3, #ARGV do
  local raw = redis.call('HGET', KEYS[1], ARGV[i])
  if raw then
    local seat = cjson.decode(raw)
    if seat.status == 'held' and seat.booking_id == booking_id
        and tonumber(seat.held_until or 0) > now then
      seat.held_until = tonumber(seat.held_until) + add
      redis.call('HSET', KEYS[1], ARGV[i], cjson.encode(seat))
      extended = extended + 1
      if seat.held_until > deadline then deadline = seat.held_until end
    end
  end
end

local result = { extended = extended }
if deadline > 0 then result.expires_at = deadline end
return cjson.encode(result)
"#,
};

/// Every engine script, in load order.
pub const ALL: &[ScriptDef] = &[
    BATCH_RESERVE,
    CONFIRM_SEATS,
    RELEASE_SEATS,
    CLEANUP_EXPIRED,
    SEATS_STATUS,
    EXTEND_HOLD,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_names_are_unique() {
        let mut names: Vec<&str> = ALL.iter().map(|s| s.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), ALL.len());
    }

    #[test]
    fn test_mutating_scripts_use_store_clock() {
        for script in ALL {
            assert!(
                script.text.contains("redis.call('TIME')"),
                "{} must take time from the store",
                script.name
            );
        }
    }

    #[test]
    fn test_counter_scripts_reference_second_key() {
        for script in [BATCH_RESERVE, RELEASE_SEATS, CLEANUP_EXPIRED, SEATS_STATUS] {
            assert!(script.text.contains("KEYS[2]"), "{} moves the counter", script.name);
        }
        // confirm never touches the counter: held seats were already off the pool
        assert!(!CONFIRM_SEATS.text.contains("KEYS[2]"));
        assert!(!EXTEND_HOLD.text.contains("KEYS[2]"));
    }
}
