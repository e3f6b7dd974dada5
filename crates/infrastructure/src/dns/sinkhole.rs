use hickory_proto::op::{Message, MessageType, OpCode, Query, ResponseCode};
use hickory_proto::rr::rdata::A;
use hickory_proto::rr::{RData, Record};
use hickory_proto::serialize::binary::BinEncodable;
use std::net::Ipv4Addr;
use std::time::Duration;

const SINKHOLE_ADDR: Ipv4Addr = Ipv4Addr::new(127, 0, 0, 1);
const SINKHOLE_TTL: u32 = 300;

/// Synthesizes a sinkhole answer for a blocked A query: the original id,
/// QR=1/AA=0/RA=1/RCODE=0, the echoed question, and a single A record
/// pointing at the loopback address.
///
/// For AAAA the reference choice documented in DESIGN.md is an empty
/// NOERROR response (ANCOUNT=0) rather than a synthesized `::` record.
pub fn build(query: &Query, id: u16) -> Vec<u8> {
    let mut message = Message::new(id, MessageType::Response, OpCode::Query);
    message.set_recursion_available(true);
    message.set_authoritative(false);
    message.set_response_code(ResponseCode::NoError);
    message.add_query(query.clone());

    if query.query_type() == hickory_proto::rr::RecordType::A {
        let record = Record::from_rdata(
            query.name().clone(),
            SINKHOLE_TTL,
            RData::A(A(SINKHOLE_ADDR)),
        );
        message.add_answer(record);
    }

    message
        .to_bytes()
        .expect("synthesized sinkhole message always encodes")
}

/// Forward deadline applied to every upstream relay attempt (§4.2).
pub const FORWARD_DEADLINE: Duration = Duration::from_secs(5);

#[cfg(test)]
mod tests {
    use super::*;
    use hickory_proto::rr::{DNSClass, Name, RecordType};
    use std::str::FromStr;

    fn question(qtype: RecordType) -> Query {
        let mut q = Query::new();
        q.set_name(Name::from_str("blocked.example.com").unwrap());
        q.set_query_type(qtype);
        q.set_query_class(DNSClass::IN);
        q
    }

    #[test]
    fn a_query_gets_loopback_answer() {
        let bytes = build(&question(RecordType::A), 42);
        let msg = Message::from_vec(&bytes).unwrap();
        assert_eq!(msg.header().id(), 42);
        assert!(msg.header().recursion_available());
        assert!(!msg.header().authoritative());
        assert_eq!(msg.answer_count(), 1);
        match msg.answers()[0].data() {
            RData::A(a) => assert_eq!(a.0, SINKHOLE_ADDR),
            other => panic!("unexpected rdata: {other:?}"),
        }
        assert_eq!(msg.answers()[0].ttl(), SINKHOLE_TTL);
    }

    #[test]
    fn aaaa_query_gets_empty_noerror() {
        let bytes = build(&question(RecordType::AAAA), 7);
        let msg = Message::from_vec(&bytes).unwrap();
        assert_eq!(msg.response_code(), ResponseCode::NoError);
        assert_eq!(msg.answer_count(), 0);
    }
}
