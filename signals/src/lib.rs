/*!
Thread-safe signals and slots for in-process event dispatch

# Design requirements:
- Slots may connect, disconnect (including themselves) and re-emit the signal from inside a running slot
  without deadlocking. The registry lock is never held while a slot or combiner runs;
  only the group order is consulted under it.
- Invocation order is total: front section, then groups ascending by the signal's group order, then back section.
- Disconnecting is immediate: `num_slots()` drops as soon as `disconnect()` returns.
- Slots can track objects owned elsewhere and stop running once those are dropped.
- Results are aggregated by a combiner pulling from a lazy sequence, so it can stop early.

# Basic usage

```rust
use sigslot::*;

let signal = Signal::<fn() -> f64>::new();
let first = signal.connect(|| 8.3, Position::AtBack);
let second = signal.connect(|| 1.2, Position::AtFront);
let third = signal.connect(|| 3.4, Position::AtBack);
assert_eq!(signal.emit(()), Some(3.4));

third.disconnect();
assert_eq!(signal.emit(()), Some(8.3));
first.disconnect();
assert_eq!(signal.emit(()), Some(1.2));
second.disconnect();
assert_eq!(signal.emit(()), None);
```

# Groups and extended slots

```rust
use sigslot::*;

let signal = Signal::<fn(i32) -> char, CollectAll>::new();
signal.connect_grouped(3, |_: i32| 'c', Position::AtBack);
signal.connect_grouped(1, |_: i32| 'a', Position::AtBack);
signal.connect(|_: i32| 'z', Position::AtBack);
// a slot that removes itself after its first call
signal.connect_extended(
    |conn: &Connection, _: i32| {
        conn.disconnect();
        'x'
    },
    Position::AtFront,
);

assert_eq!(signal.emit((0,)), vec!['x', 'a', 'c', 'z']);
assert_eq!(signal.emit((0,)), vec!['a', 'c', 'z']);
```
*/

mod bind;
mod combiner;
mod connection;
mod error;
mod lock;
mod order;
mod position;
mod registry;
mod signal;
mod signature;
mod slot;
mod tracking;

pub use bind::*;
pub use combiner::*;
pub use connection::{Connection, ScopedConnection};
pub use error::*;
pub use lock::*;
pub use order::*;
pub use position::*;
pub use registry::*;
pub use signal::*;
pub use signature::*;
pub use slot::*;
pub use tracking::*;
