//! Priority-ordered event log decoding.
//!
//! A [`LogDecoder`] owns a table of [`EventShape`]s. Each raw log is matched
//! against the shapes from most to least specific; the first shape that
//! accepts the log produces the decoded value. Logs that no shape accepts are
//! dropped: receipts routinely carry unrelated logs (token transfers,
//! approvals) emitted by other contracts touched by the same transaction.

use std::cmp::Reverse;
use std::fmt;

use alloy_primitives::{Address, B256, Log, LogData};
use alloy_sol_types::{SolEvent, TopicList};

/// A log that did not match any known event shape.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("no known event shape matches log from {address} (topic0: {})", topic0_display(.topic0))]
pub struct DecodeMismatch {
    pub address: Address,
    pub topic0: Option<B256>,
}

fn topic0_display(topic0: &Option<B256>) -> String {
    topic0.map_or_else(|| "none".to_string(), |t| t.to_string())
}

type DecodeFn<E> = Box<dyn Fn(&LogData) -> Option<E> + Send + Sync>;

/// One recognisable log layout.
pub struct EventShape<E> {
    name: &'static str,
    selector: B256,
    topic_count: usize,
    emitter: Option<Address>,
    decode: DecodeFn<E>,
}

impl<E> EventShape<E> {
    /// Shape for a `sol!`-generated event type.
    ///
    /// `wrap` lifts the decoded event into the caller's event enum.
    pub fn sol<T>(wrap: impl Fn(T) -> E + Send + Sync + 'static) -> Self
    where
        T: SolEvent + 'static,
    {
        Self::try_sol(move |event: T| Some(wrap(event)))
    }

    /// Like [`EventShape::sol`], but `wrap` may reject field values the
    /// caller's enum cannot represent. A rejected log is a mismatch.
    pub fn try_sol<T>(wrap: impl Fn(T) -> Option<E> + Send + Sync + 'static) -> Self
    where
        T: SolEvent + 'static,
    {
        Self {
            name: T::SIGNATURE,
            selector: T::SIGNATURE_HASH,
            topic_count: <T::TopicList as TopicList>::COUNT,
            emitter: None,
            decode: Box::new(move |data| T::decode_log_data(data).ok().and_then(&wrap)),
        }
    }

    /// Restrict the shape to logs emitted by one contract.
    pub fn from_emitter(mut self, address: Address) -> Self {
        self.emitter = Some(address);
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn selector(&self) -> B256 {
        self.selector
    }

    /// Ordering key: an emitter filter outranks any topic count.
    fn specificity(&self) -> (bool, usize) {
        (self.emitter.is_some(), self.topic_count)
    }

    fn try_match(&self, log: &Log) -> Option<E> {
        if self.emitter.is_some_and(|emitter| emitter != log.address) {
            return None;
        }

        let topics = log.topics();
        if topics.len() != self.topic_count || topics.first() != Some(&self.selector) {
            return None;
        }

        (self.decode)(&log.data)
    }
}

impl<E> fmt::Debug for EventShape<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventShape")
            .field("name", &self.name)
            .field("selector", &self.selector)
            .field("topic_count", &self.topic_count)
            .field("emitter", &self.emitter)
            .finish()
    }
}

/// Shape table plus matching logic.
///
/// Decoding is pure: the same logs and the same table always yield the same
/// sequence, in log order.
#[derive(Debug)]
pub struct LogDecoder<E> {
    shapes: Vec<EventShape<E>>,
}

impl<E> LogDecoder<E> {
    /// Build a decoder. Shapes are ordered most specific first; registration
    /// order breaks ties.
    pub fn new(mut shapes: Vec<EventShape<E>>) -> Self {
        shapes.sort_by_key(|shape| Reverse(shape.specificity()));
        Self { shapes }
    }

    /// Shape names in matching order.
    pub fn shape_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.shapes.iter().map(EventShape::name)
    }

    /// Decode a single log.
    pub fn try_decode(&self, log: &Log) -> Result<E, DecodeMismatch> {
        self.shapes
            .iter()
            .find_map(|shape| shape.try_match(log))
            .ok_or_else(|| DecodeMismatch {
                address: log.address,
                topic0: log.topics().first().copied(),
            })
    }

    /// Decode every recognisable log, dropping the rest.
    pub fn decode(&self, logs: &[Log]) -> Vec<E> {
        logs.iter()
            .filter_map(|log| match self.try_decode(log) {
                Ok(event) => Some(event),
                Err(mismatch) => {
                    tracing::trace!(%mismatch, "dropping unrecognised log");
                    None
                }
            })
            .collect()
    }

    /// First decoded event satisfying `predicate`, if any.
    pub fn decode_first<F>(&self, logs: &[Log], mut predicate: F) -> Option<E>
    where
        F: FnMut(&E) -> bool,
    {
        logs.iter()
            .filter_map(|log| self.try_decode(log).ok())
            .find(|event| predicate(event))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{U256, address};
    use alloy_sol_types::sol;

    sol! {
        event Transfer(address indexed from, address indexed to, uint256 value);
        event Ping(uint256 indexed id);
    }

    // Same signature as `Transfer` with three indexed params (ERC-721 layout).
    mod nft {
        alloy_sol_types::sol! {
            event Transfer(address indexed from, address indexed to, uint256 indexed tokenId);
        }
    }

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Decoded {
        Fungible(U256),
        NonFungible(U256),
        Ping(U256),
        Watched(U256),
    }

    const WATCHED: Address = address!("00000000000000000000000000000000000000cc");

    fn transfer(emitter: Address, value: u64) -> Log {
        Log {
            address: emitter,
            data: Transfer {
                from: Address::ZERO,
                to: Address::repeat_byte(1),
                value: U256::from(value),
            }
            .encode_log_data(),
        }
    }

    fn decoder() -> LogDecoder<Decoded> {
        LogDecoder::new(vec![
            EventShape::sol(|t: Transfer| Decoded::Fungible(t.value)),
            EventShape::sol(|p: Ping| Decoded::Ping(p.id)),
            EventShape::sol(|t: nft::Transfer| Decoded::NonFungible(t.tokenId)),
            EventShape::sol(|t: Transfer| Decoded::Watched(t.value)).from_emitter(WATCHED),
        ])
    }

    #[test]
    fn most_specific_shape_wins() {
        let decoder = decoder();
        let names: Vec<_> = decoder.shape_names().collect();
        assert_eq!(names[0], Transfer::SIGNATURE);

        let other = address!("00000000000000000000000000000000000000dd");
        let events = decoder.decode(&[transfer(WATCHED, 5), transfer(other, 6)]);

        assert_eq!(events, vec![Decoded::Watched(U256::from(5)), Decoded::Fungible(U256::from(6))]);
    }

    #[test]
    fn topic_count_disambiguates_shared_selector() {
        let nft_log = Log {
            address: Address::ZERO,
            data: nft::Transfer {
                from: Address::ZERO,
                to: Address::ZERO,
                tokenId: U256::from(42),
            }
            .encode_log_data(),
        };

        assert_eq!(
            decoder().try_decode(&nft_log),
            Ok(Decoded::NonFungible(U256::from(42)))
        );
    }

    #[test]
    fn unmatched_logs_are_dropped() {
        let junk = Log {
            address: Address::ZERO,
            data: LogData::new_unchecked(vec![B256::repeat_byte(9)], Default::default()),
        };
        let ping = Log {
            address: Address::ZERO,
            data: Ping { id: U256::from(3) }.encode_log_data(),
        };

        let decoder = decoder();
        assert!(decoder.try_decode(&junk).is_err());
        assert_eq!(decoder.decode(&[junk, ping]), vec![Decoded::Ping(U256::from(3))]);
        assert!(decoder.decode(&[]).is_empty());
    }

    #[test]
    fn decoding_is_deterministic() {
        let other = address!("00000000000000000000000000000000000000dd");
        let logs = vec![transfer(other, 1), transfer(WATCHED, 2), transfer(other, 3)];

        let first = decoder().decode(&logs);
        let second = decoder().decode(&logs);
        assert_eq!(first, second);

        let found = decoder().decode_first(&logs, |e| matches!(e, Decoded::Watched(_)));
        assert_eq!(found, Some(Decoded::Watched(U256::from(2))));
    }
}
