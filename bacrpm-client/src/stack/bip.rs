//! BACnet/IP protocol stack

use crate::config::SessionConfig;
use crate::error::{BacnetError, BacnetResult};
use crate::stack::tsm::{TransactionStateMachine, TransactionStatus};
use crate::stack::ProtocolStack;
use async_trait::async_trait;
use bacrpm_application::{InboundEvent, RequestBatch};
use bacrpm_core::BacnetAddress;
use bacrpm_encoding::apdu::{self, Apdu, SERVICE_I_AM, SERVICE_READ_PROPERTY_MULTIPLE, SERVICE_WHO_IS};
use bacrpm_encoding::services::{self, IAm, WhoIs};
use bacrpm_encoding::NpduHeader;
use bacrpm_transport::{BipDatalink, DatalinkLayer, ReceivedFrame};
use bytes::BytesMut;
use std::time::Duration;

/// Protocol stack over a datalink, BACnet/IP by default
pub struct BipStack<D: DatalinkLayer = BipDatalink> {
    datalink: D,
    tsm: TransactionStateMachine,
    max_apdu: u16,
}

impl<D: DatalinkLayer> BipStack<D> {
    pub fn new(datalink: D, config: &SessionConfig) -> Self {
        Self {
            datalink,
            tsm: TransactionStateMachine::new(config.apdu_timeout, config.apdu_retries),
            max_apdu: config.max_apdu,
        }
    }

    /// Open the underlying datalink
    pub async fn open(&mut self) -> BacnetResult<()> {
        self.datalink.open().await
    }

    pub async fn close(&mut self) -> BacnetResult<()> {
        self.datalink.close().await
    }

    async fn send_apdu(&mut self, destination: &BacnetAddress, apdu: &[u8], expecting_reply: bool) -> BacnetResult<Vec<u8>> {
        let mut buffer = BytesMut::with_capacity(apdu.len() + 16);
        NpduHeader::for_destination(destination, expecting_reply).encode(&mut buffer)?;
        buffer.extend_from_slice(apdu);
        let npdu = buffer.to_vec();
        self.datalink.send(destination, &npdu).await?;
        Ok(npdu)
    }

    /// Decode one received frame into an event
    fn decode_frame(&mut self, frame: ReceivedFrame) -> InboundEvent {
        let (header, offset) = match NpduHeader::decode(&frame.npdu) {
            Ok(decoded) => decoded,
            Err(e) => {
                log::debug!("Dropping NPDU from {}: {}", frame.source, e);
                return InboundEvent::Unrelated;
            }
        };
        if header.network_message.is_some() {
            return InboundEvent::Unrelated;
        }
        let source = header.source_address(frame.source.mac);
        let apdu = match Apdu::decode(&frame.npdu[offset..]) {
            Ok(apdu) => apdu,
            Err(e) => {
                log::debug!("Dropping APDU from {}: {}", source, e);
                return InboundEvent::Unrelated;
            }
        };
        log::trace!("Received {:?} from {}", apdu, source);

        let event = Self::classify(apdu, source);

        // a reply frees its invoke id before the session sees it
        if let (Some(source), Some(invoke_id)) = (event.source(), event.invoke_id()) {
            if self.tsm.is_reply_to(invoke_id, source) {
                self.tsm.release(invoke_id);
            }
        }
        event
    }

    fn classify(apdu: Apdu<'_>, source: BacnetAddress) -> InboundEvent {
        match apdu {
            Apdu::UnconfirmedRequest {
                service_choice: SERVICE_I_AM,
                data,
            } => match IAm::decode(data) {
                Ok(i_am) => InboundEvent::IAm {
                    source,
                    device_id: i_am.device_id,
                    max_apdu: i_am.max_apdu,
                },
                Err(e) => {
                    log::debug!("Invalid I-Am from {}: {}", source, e);
                    InboundEvent::Unrelated
                }
            },
            Apdu::ComplexAck {
                invoke_id,
                service_choice: SERVICE_READ_PROPERTY_MULTIPLE,
                segmented,
                data,
            } => {
                let decoded = if segmented {
                    Err(BacnetError::Decoding("Segmented acknowledgements are not supported".to_string()))
                } else {
                    services::decode_ack(data)
                };
                InboundEvent::ComplexAck {
                    source,
                    invoke_id,
                    decoded,
                }
            }
            Apdu::ComplexAck {
                invoke_id,
                service_choice,
                ..
            } => InboundEvent::Malformed {
                source,
                invoke_id,
                detail: format!("Unexpected ComplexAck for service {}", service_choice),
            },
            Apdu::SimpleAck {
                invoke_id,
                service_choice,
            } => InboundEvent::Malformed {
                source,
                invoke_id,
                detail: format!("Unexpected SimpleAck for service {}", service_choice),
            },
            Apdu::Error { invoke_id, data, .. } => match services::decode_error(data) {
                Ok(error) => InboundEvent::Error {
                    source,
                    invoke_id,
                    error,
                },
                Err(e) => InboundEvent::Malformed {
                    source,
                    invoke_id,
                    detail: format!("Error PDU: {}", e),
                },
            },
            Apdu::Reject { invoke_id, reason } => InboundEvent::Reject {
                source,
                invoke_id,
                reason,
            },
            Apdu::Abort {
                invoke_id,
                reason,
                server,
            } => InboundEvent::Abort {
                source,
                invoke_id,
                reason,
                server,
            },
            Apdu::ConfirmedRequest { .. } | Apdu::SegmentAck { .. } | Apdu::UnconfirmedRequest { .. } => {
                InboundEvent::Unrelated
            }
        }
    }
}

#[async_trait]
impl<D: DatalinkLayer> ProtocolStack for BipStack<D> {
    async fn send_who_is(&mut self, device_id: u32) -> BacnetResult<()> {
        let apdu = apdu::encode_unconfirmed_request(SERVICE_WHO_IS, &WhoIs::device(device_id).encode());
        log::debug!("Sending Who-Is for device {}", device_id);
        self.send_apdu(&BacnetAddress::broadcast(), &apdu, false).await?;
        Ok(())
    }

    async fn send_read_property_multiple(
        &mut self,
        destination: &BacnetAddress,
        max_apdu: u16,
        batch: &RequestBatch,
    ) -> BacnetResult<u8> {
        let service_data = services::encode_request(batch.entries())?;
        let invoke_id = self.tsm.next_invoke_id()?;
        let apdu = apdu::encode_confirmed_request(invoke_id, SERVICE_READ_PROPERTY_MULTIPLE, self.max_apdu, &service_data);
        if apdu.len() > max_apdu as usize {
            return Err(BacnetError::Configuration(format!(
                "ReadPropertyMultiple request of {} octets exceeds the device's max APDU of {}",
                apdu.len(),
                max_apdu
            )));
        }

        let npdu = self.send_apdu(destination, &apdu, true).await?;
        self.tsm.start(invoke_id, destination.clone(), npdu);
        log::debug!(
            "Sent ReadPropertyMultiple for {} objects to {} (invoke id {})",
            batch.len(),
            destination,
            invoke_id
        );
        Ok(invoke_id)
    }

    async fn receive(&mut self, wait: Duration) -> BacnetResult<Option<InboundEvent>> {
        match self.datalink.receive(wait).await? {
            Some(frame) => Ok(Some(self.decode_frame(frame))),
            None => Ok(None),
        }
    }

    async fn advance_timers(&mut self, elapsed: Duration) -> BacnetResult<()> {
        for resend in self.tsm.advance(elapsed) {
            log::debug!("Resending invoke id {} to {}", resend.invoke_id, resend.destination);
            self.datalink.send(&resend.destination, &resend.npdu).await?;
        }
        Ok(())
    }

    fn transaction_status(&self, invoke_id: u8) -> TransactionStatus {
        self.tsm.status(invoke_id)
    }

    fn release_transaction(&mut self, invoke_id: u8) {
        self.tsm.release(invoke_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bacrpm_application::{CrossReferenceTable, RequestSetBuilder};
    use bacrpm_core::datatypes::ApplicationValue;
    use crate::session::{FailureReason, SessionController, SessionState};
    use bacrpm_transport::FrameAccessor;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    /// Datalink double recording sends and replaying queued frames
    #[derive(Default, Clone)]
    struct ScriptedDatalink {
        sent: Arc<Mutex<Vec<(BacnetAddress, Vec<u8>)>>>,
        inbound: Arc<Mutex<VecDeque<ReceivedFrame>>>,
    }

    #[async_trait]
    impl FrameAccessor for ScriptedDatalink {
        async fn send(&mut self, destination: &BacnetAddress, npdu: &[u8]) -> BacnetResult<()> {
            self.sent.lock().unwrap().push((destination.clone(), npdu.to_vec()));
            Ok(())
        }

        async fn receive(&mut self, _wait: Duration) -> BacnetResult<Option<ReceivedFrame>> {
            Ok(self.inbound.lock().unwrap().pop_front())
        }

        fn is_closed(&self) -> bool {
            false
        }

        async fn close(&mut self) -> BacnetResult<()> {
            Ok(())
        }
    }

    #[async_trait]
    impl DatalinkLayer for ScriptedDatalink {
        async fn open(&mut self) -> BacnetResult<()> {
            Ok(())
        }
    }

    fn device() -> BacnetAddress {
        BacnetAddress::local(vec![10, 0, 0, 2, 0xBA, 0xC0])
    }

    fn batch() -> RequestBatch {
        let mut table = CrossReferenceTable::new();
        table.ingest("TempRoom1", 0, 5);
        let mut builder = RequestSetBuilder::new(&mut table, "points.csv");
        builder.request("TempRoom1").unwrap();
        builder.build().unwrap()
    }

    #[tokio::test]
    async fn test_who_is_is_global_broadcast() {
        let datalink = ScriptedDatalink::default();
        let mut stack = BipStack::new(datalink.clone(), &SessionConfig::default());
        stack.send_who_is(1234).await.unwrap();

        let sent = datalink.sent.lock().unwrap();
        assert_eq!(sent[0].0, BacnetAddress::broadcast());
        assert_eq!(
            sent[0].1,
            vec![0x01, 0x20, 0xFF, 0xFF, 0x00, 0xFF, 0x10, 0x08, 0x0A, 0x04, 0xD2, 0x1A, 0x04, 0xD2]
        );
    }

    #[tokio::test]
    async fn test_request_and_ack() {
        let datalink = ScriptedDatalink::default();
        let mut stack = BipStack::new(datalink.clone(), &SessionConfig::default());
        let invoke_id = stack.send_read_property_multiple(&device(), 1476, &batch()).await.unwrap();
        assert_eq!(invoke_id, 1);
        assert_eq!(stack.transaction_status(invoke_id), TransactionStatus::Pending);
        assert_eq!(
            datalink.sent.lock().unwrap()[0].1,
            vec![0x01, 0x04, 0x00, 0x05, 0x01, 0x0E, 0x0C, 0x00, 0x00, 0x00, 0x05, 0x1E, 0x09, 0x55, 0x1F]
        );

        let ack = vec![
            0x01, 0x00, 0x30, 0x01, 0x0E, 0x0C, 0x00, 0x00, 0x00, 0x05, 0x1E, 0x29, 0x55, 0x4E, 0x44, 0x41, 0xAC,
            0x00, 0x00, 0x4F, 0x1F,
        ];
        datalink.inbound.lock().unwrap().push_back(ReceivedFrame {
            source: device(),
            npdu: ack,
        });

        match stack.receive(Duration::from_millis(100)).await.unwrap() {
            Some(InboundEvent::ComplexAck {
                invoke_id: 1, decoded, ..
            }) => {
                let results = decoded.unwrap();
                assert_eq!(
                    results[0].results[0].outcome,
                    bacrpm_core::datatypes::PropertyOutcome::Values(vec![ApplicationValue::Real(21.5)])
                );
            }
            other => panic!("unexpected event {:?}", other),
        }
        assert_eq!(stack.transaction_status(invoke_id), TransactionStatus::Released);
    }

    #[tokio::test]
    async fn test_reply_from_other_station_keeps_transaction() {
        let datalink = ScriptedDatalink::default();
        let mut stack = BipStack::new(datalink.clone(), &SessionConfig::default());
        let invoke_id = stack.send_read_property_multiple(&device(), 1476, &batch()).await.unwrap();

        datalink.inbound.lock().unwrap().push_back(ReceivedFrame {
            source: BacnetAddress::local(vec![10, 0, 0, 3, 0xBA, 0xC0]),
            npdu: vec![0x01, 0x00, 0x60, invoke_id, 0x02],
        });
        let event = stack.receive(Duration::from_millis(100)).await.unwrap().unwrap();
        assert!(event.is_fault());
        assert_eq!(stack.transaction_status(invoke_id), TransactionStatus::Pending);
    }

    #[tokio::test]
    async fn test_request_larger_than_device_accepts() {
        let mut stack = BipStack::new(ScriptedDatalink::default(), &SessionConfig::default());
        let result = stack.send_read_property_multiple(&device(), 10, &batch()).await;
        assert!(matches!(result, Err(BacnetError::Configuration(_))));
    }

    #[tokio::test]
    async fn test_timer_resends_then_fails() {
        let datalink = ScriptedDatalink::default();
        let config = SessionConfig::default().with_apdu_retries(1);
        let mut stack = BipStack::new(datalink.clone(), &config);
        let invoke_id = stack.send_read_property_multiple(&device(), 1476, &batch()).await.unwrap();

        stack.advance_timers(Duration::from_secs(3)).await.unwrap();
        assert_eq!(datalink.sent.lock().unwrap().len(), 2);
        stack.advance_timers(Duration::from_secs(3)).await.unwrap();
        assert_eq!(stack.transaction_status(invoke_id), TransactionStatus::Failed);
        stack.release_transaction(invoke_id);
        assert_eq!(stack.transaction_status(invoke_id), TransactionStatus::Released);
    }

    #[tokio::test]
    async fn test_i_am_event() {
        let datalink = ScriptedDatalink::default();
        let mut stack = BipStack::new(datalink.clone(), &SessionConfig::default());
        datalink.inbound.lock().unwrap().push_back(ReceivedFrame {
            source: device(),
            npdu: vec![
                0x01, 0x00, 0x10, 0x00, 0xC4, 0x02, 0x00, 0x04, 0xD2, 0x22, 0x05, 0xC4, 0x91, 0x03, 0x21, 0x05,
            ],
        });
        match stack.receive(Duration::from_millis(100)).await.unwrap() {
            Some(InboundEvent::IAm {
                device_id, max_apdu, ..
            }) => {
                assert_eq!(device_id, 1234);
                assert_eq!(max_apdu, 1476);
            }
            other => panic!("unexpected event {:?}", other),
        }
        assert!(stack.receive(Duration::from_millis(100)).await.unwrap().is_none());
    }

    fn bound_session(datalink: ScriptedDatalink) -> SessionController<BipStack<ScriptedDatalink>> {
        let mut table = CrossReferenceTable::new();
        table.ingest("TempRoom1", 0, 5);
        let mut builder = RequestSetBuilder::new(&mut table, "points.csv");
        builder.request("TempRoom1").unwrap();
        let batch = builder.build().unwrap();
        let config = SessionConfig::default();
        let stack = BipStack::new(datalink, &config);
        SessionController::new(stack, config, 1234, table, batch).with_static_binding(device())
    }

    async fn reply_to_session(npdu: Vec<u8>) -> SessionState {
        let datalink = ScriptedDatalink::default();
        let mut session = bound_session(datalink.clone());
        session.start().await;
        assert_eq!(session.state(), &SessionState::AwaitingAck);

        datalink.inbound.lock().unwrap().push_back(ReceivedFrame {
            source: device(),
            npdu,
        });
        session.tick(0).await;
        session.tick(0).await;
        assert!(session.document().is_none());
        session.state().clone()
    }

    #[tokio::test]
    async fn test_undecodable_error_pdu_fails_session() {
        // Error PDU for invoke id 1 with a truncated error class
        let state = reply_to_session(vec![0x01, 0x00, 0x50, 0x01, 0x0E, 0x91]).await;
        assert!(matches!(
            state,
            SessionState::Failed(FailureReason::MalformedResponse(_))
        ));
    }

    #[tokio::test]
    async fn test_error_pdu_fails_session() {
        // object: unknown-object
        let state = reply_to_session(vec![0x01, 0x00, 0x50, 0x01, 0x0E, 0x91, 0x01, 0x91, 0x1F]).await;
        assert_eq!(
            state,
            SessionState::Failed(FailureReason::Error(bacrpm_core::datatypes::ErrorCode::new(1, 31)))
        );
    }

    #[tokio::test]
    async fn test_ack_for_other_service_fails_session() {
        // ReadProperty ack in place of the ReadPropertyMultiple ack
        let state = reply_to_session(vec![
            0x01, 0x00, 0x30, 0x01, 0x0C, 0x0C, 0x00, 0x00, 0x00, 0x05, 0x19, 0x55, 0x3E, 0x44, 0x41, 0xAC, 0x00,
            0x00, 0x3F,
        ])
        .await;
        assert!(matches!(
            state,
            SessionState::Failed(FailureReason::MalformedResponse(_))
        ));

        let state = reply_to_session(vec![0x01, 0x00, 0x20, 0x01, 0x0E]).await;
        assert!(matches!(
            state,
            SessionState::Failed(FailureReason::MalformedResponse(_))
        ));
    }

    #[tokio::test]
    async fn test_simple_ack_is_malformed_reply() {
        let datalink = ScriptedDatalink::default();
        let mut stack = BipStack::new(datalink.clone(), &SessionConfig::default());
        let invoke_id = stack.send_read_property_multiple(&device(), 1476, &batch()).await.unwrap();
        datalink.inbound.lock().unwrap().push_back(ReceivedFrame {
            source: device(),
            npdu: vec![0x01, 0x00, 0x20, invoke_id, 0x0E],
        });
        let event = stack.receive(Duration::from_millis(100)).await.unwrap().unwrap();
        assert!(matches!(event, InboundEvent::Malformed { invoke_id: 1, .. }));
        assert_eq!(stack.transaction_status(invoke_id), TransactionStatus::Released);
    }
}
