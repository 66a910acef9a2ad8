use std::any::Any;
use std::cell::Cell;
use std::io::{self, SeekFrom};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serializable::{
    short_type_name, write_all, BodyResult, ByteStream, ExtraData, MagicValue, NullSerializable,
    ParentLink, RequirementViolation, Requirements, ReusableReader, ReusableWriter, SerialResult,
    Serializable, SerializationError, SerializationRequirements, Stream, StreamId, UnitAddr,
    UnitHandle,
};

/// A unit whose body hooks only count their invocations (the write body
/// also moves one byte so post-write failures leave a visibly mutated
/// stream).
struct ProbeUnit {
    requirements: Arc<SerializationRequirements>,
    link:         ParentLink,
    read_calls:   Cell<usize>,
    write_calls:  Cell<usize>,
    magic_calls:  Cell<usize>,
}

impl ProbeUnit {
    fn with_requirements(requirements: SerializationRequirements) -> ProbeUnit {
        ProbeUnit {
            requirements: Arc::new(requirements),
            link:         ParentLink::empty(),
            read_calls:   Cell::new(0),
            write_calls:  Cell::new(0),
            magic_calls:  Cell::new(0),
        }
    }

    fn unconstrained() -> ProbeUnit {
        ProbeUnit::with_requirements(SerializationRequirements::default())
    }

    fn set_parent(&mut self, parent: Option<UnitHandle>) {
        let addr = UnitAddr::of(&*self);
        self.link.assign(addr, parent);
    }
}

impl Serializable for ProbeUnit {
    fn type_label(&self) -> &'static str {
        short_type_name::<ProbeUnit>()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn parent(&self) -> &dyn Serializable {
        self.link.resolve(self)
    }

    fn requirements(&self) -> Arc<dyn Requirements> {
        self.requirements.clone()
    }

    fn read_body(
        &mut self,
        _stream: &mut dyn Stream,
        _reader: Option<&mut ReusableReader>,
        _unfixed_len: bool,
    ) -> BodyResult<Option<UnitHandle>> {
        self.read_calls.set(self.read_calls.get() + 1);
        Ok(None)
    }

    fn write_body(
        &self,
        stream: &mut dyn Stream,
        _writer: Option<&mut ReusableWriter>,
        _version_spec: Option<&dyn Serializable>,
        _unfixed_len: bool,
    ) -> BodyResult<()> {
        self.write_calls.set(self.write_calls.get() + 1);
        write_all(stream, &[0xA5])?;
        Ok(())
    }

    fn read_magic(
        &self,
        _stream: &mut dyn Stream,
        _reader: Option<&mut ReusableReader>,
        _unfixed_len: bool,
    ) -> BodyResult<MagicValue> {
        self.magic_calls.set(self.magic_calls.get() + 1);
        Ok(MagicValue::U32(0x5453_4554))
    }
}

/// A fully-capable stream that only counts accesses.
struct CountingStream {
    id:     StreamId,
    reads:  usize,
    writes: usize,
    seeks:  usize,
}

impl CountingStream {
    fn new() -> CountingStream {
        CountingStream { id: StreamId::fresh(), reads: 0, writes: 0, seeks: 0 }
    }

    fn touched(&self) -> bool {
        self.reads + self.writes + self.seeks > 0
    }
}

impl Stream for CountingStream {
    fn id(&self) -> StreamId {
        self.id
    }

    fn can_read(&self) -> bool {
        true
    }

    fn can_write(&self) -> bool {
        true
    }

    fn can_seek(&self) -> bool {
        true
    }

    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        self.reads += 1;
        Ok(0)
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.writes += 1;
        Ok(buf.len())
    }

    fn seek(&mut self, _pos: SeekFrom) -> io::Result<u64> {
        self.seeks += 1;
        Ok(0)
    }
}

#[test]
fn parent_defaults_to_the_unit_itself() {
    let unit = ProbeUnit::unconstrained();
    assert_eq!(UnitAddr::of(unit.parent()), UnitAddr::of(&unit));
}

#[test]
fn assigned_parent_is_reported_until_cleared() {
    let mut unit = ProbeUnit::unconstrained();
    let parent = NullSerializable::shared();
    unit.set_parent(Some(parent.clone()));
    assert_eq!(UnitAddr::of(unit.parent()), UnitAddr::of(parent.as_ref()));
    unit.set_parent(None);
    assert_eq!(UnitAddr::of(unit.parent()), UnitAddr::of(&unit));
}

#[test]
fn null_unit_never_touches_the_stream() {
    let mut stream = CountingStream::new();
    let mut unit = NullSerializable;
    assert!(unit.read(&mut stream, None, true).unwrap().is_none());
    unit.write(&mut stream, None, None, true).unwrap();
    assert!(unit.check_magic(&|_| false, &mut stream, None, true).unwrap());
    assert!(!stream.touched());
}

#[test]
fn seek_requirement_aborts_before_the_read_body() {
    let mut unit = ProbeUnit::with_requirements(SerializationRequirements {
        read_needs_seek: true,
        ..Default::default()
    });
    let mut stream = ByteStream::new().deny_seek();
    let error = unit.read(&mut stream, None, false).unwrap_err();
    assert_eq!(error.violation(), Some(&RequirementViolation::StreamNotSeekable));
    assert_eq!(unit.read_calls.get(), 0);
    assert!(!error.is_write());
}

#[test]
fn reader_bound_elsewhere_is_rejected() {
    let mut unit = ProbeUnit::unconstrained();
    let other = ByteStream::new();
    let mut stream = ByteStream::new();
    let mut reader = ReusableReader::bind(&other);
    let error = unit.read(&mut stream, Some(&mut reader), false).unwrap_err();
    match error.violation() {
        Some(RequirementViolation::ReaderNotBound { bound, supplied }) => {
            assert_eq!(*bound, other.id());
            assert_eq!(*supplied, stream.id());
        }
        violation => panic!("unexpected violation: {violation:?}"),
    }
    assert_eq!(unit.read_calls.get(), 0);
}

#[test]
fn unfixed_len_support_is_tracked_per_direction() {
    let mut unit = ProbeUnit::with_requirements(SerializationRequirements {
        read_supports_unfixed_len: true,
        ..Default::default()
    });
    let mut stream = ByteStream::new();
    unit.read(&mut stream, None, true).unwrap();
    let error = unit.write(&mut stream, None, None, true).unwrap_err();
    assert_eq!(error.violation(), Some(&RequirementViolation::UnfixedLenWriteUnsupported));
    assert!(error.is_write());
    assert_eq!(unit.write_calls.get(), 0);
}

#[test]
fn earlier_check_wins_and_later_predicates_never_run() {
    let consulted = Arc::new(AtomicBool::new(false));
    let flag = consulted.clone();
    let mut unit = ProbeUnit::with_requirements(SerializationRequirements {
        validate_read_parent: Some(Arc::new(move |_| {
            flag.store(true, Ordering::SeqCst);
            false
        })),
        ..Default::default()
    });
    let mut stream = ByteStream::write_only();
    let error = unit.read(&mut stream, None, false).unwrap_err();
    assert_eq!(error.violation(), Some(&RequirementViolation::StreamNotReadable));
    assert!(!consulted.load(Ordering::SeqCst));
    assert_eq!(unit.read_calls.get(), 0);
}

#[test]
fn post_write_failure_surfaces_after_one_body_call() {
    let unit = ProbeUnit::with_requirements(SerializationRequirements {
        post_write_extra_data: Some(Arc::new(|_| false)),
        ..Default::default()
    });
    let mut stream = ByteStream::new();
    let error = unit.write(&mut stream, None, None, false).unwrap_err();
    assert_eq!(unit.write_calls.get(), 1);
    assert_eq!(error.violation(), Some(&RequirementViolation::ExtraDataRejected));
    assert_eq!(error.message(), Some("post-write validation failed"));
    assert!(error.is_write());
    // The body bytes really landed before the rejection.
    assert_eq!(stream.bytes(), &[0xA5u8][..]);
}

#[test]
fn version_spec_is_vetted_after_the_read_body() {
    let mut unit = ProbeUnit::with_requirements(SerializationRequirements {
        validate_version_spec: Some(Arc::new(|spec| spec.is_some())),
        ..Default::default()
    });
    let mut stream = ByteStream::new();
    let error = unit.read(&mut stream, None, false).unwrap_err();
    assert_eq!(unit.read_calls.get(), 1);
    assert_eq!(error.violation(), Some(&RequirementViolation::VersionSpecRejected));
    assert_eq!(error.message(), Some("post-read validation failed"));
}

#[test]
fn magic_probe_runs_the_checker_on_the_fetched_value() {
    let unit = ProbeUnit::unconstrained();
    let mut stream = ByteStream::new();
    let accepted = unit
        .check_magic(&|magic| magic == &MagicValue::U32(0x5453_4554), &mut stream, None, false)
        .unwrap();
    assert!(accepted);
    let rejected = unit
        .check_magic(&|magic| magic == &MagicValue::U32(0), &mut stream, None, false)
        .unwrap();
    assert!(!rejected);
    assert_eq!(unit.magic_calls.get(), 2);
}

/// A unit whose every body hook fails.
struct BrokenUnit;

impl Serializable for BrokenUnit {
    fn type_label(&self) -> &'static str {
        "BrokenUnit"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn parent(&self) -> &dyn Serializable {
        self
    }

    fn read_body(
        &mut self,
        _stream: &mut dyn Stream,
        _reader: Option<&mut ReusableReader>,
        _unfixed_len: bool,
    ) -> BodyResult<Option<UnitHandle>> {
        Err(io::Error::new(io::ErrorKind::UnexpectedEof, "truncated").into())
    }

    fn write_body(
        &self,
        _stream: &mut dyn Stream,
        _writer: Option<&mut ReusableWriter>,
        _version_spec: Option<&dyn Serializable>,
        _unfixed_len: bool,
    ) -> BodyResult<()> {
        Err(io::Error::new(io::ErrorKind::WriteZero, "refused").into())
    }

    fn read_magic(
        &self,
        _stream: &mut dyn Stream,
        _reader: Option<&mut ReusableReader>,
        _unfixed_len: bool,
    ) -> BodyResult<MagicValue> {
        Err(io::Error::new(io::ErrorKind::UnexpectedEof, "truncated").into())
    }
}

#[test]
fn body_failures_carry_direction_and_cause() {
    let mut unit = BrokenUnit;
    let mut stream = ByteStream::new();

    let error = unit.read(&mut stream, None, false).unwrap_err();
    assert_eq!(error.to_string(), "Failed to deserialize type \"BrokenUnit\"");
    assert!(!error.is_write());
    assert!(error.violation().is_none());
    assert!(std::error::Error::source(&error).is_some());

    let error = unit.write(&mut stream, None, None, false).unwrap_err();
    assert_eq!(error.to_string(), "Failed to serialize type \"BrokenUnit\"");
    assert!(error.is_write());

    let error = unit.check_magic(&|_| true, &mut stream, None, false).unwrap_err();
    assert!(!error.is_write());
}

#[derive(Debug)]
struct TicketBag {
    allowed: bool,
}

impl ExtraData for TicketBag {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

struct BaggedUnit {
    bag: TicketBag,
}

impl Serializable for BaggedUnit {
    fn type_label(&self) -> &'static str {
        short_type_name::<BaggedUnit>()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn parent(&self) -> &dyn Serializable {
        self
    }

    fn extra_data(&self) -> &dyn ExtraData {
        &self.bag
    }

    fn read_body(
        &mut self,
        _stream: &mut dyn Stream,
        _reader: Option<&mut ReusableReader>,
        _unfixed_len: bool,
    ) -> BodyResult<Option<UnitHandle>> {
        Ok(None)
    }

    fn write_body(
        &self,
        _stream: &mut dyn Stream,
        _writer: Option<&mut ReusableWriter>,
        _version_spec: Option<&dyn Serializable>,
        _unfixed_len: bool,
    ) -> BodyResult<()> {
        Ok(())
    }

    fn read_magic(
        &self,
        _stream: &mut dyn Stream,
        _reader: Option<&mut ReusableReader>,
        _unfixed_len: bool,
    ) -> BodyResult<MagicValue> {
        Ok(MagicValue::U32(0))
    }
}

#[test]
fn parent_extra_data_feeds_cross_cutting_checks() {
    let parent: UnitHandle = Arc::new(BaggedUnit { bag: TicketBag { allowed: false } });
    let mut unit = ProbeUnit::with_requirements(SerializationRequirements {
        pre_read_parent_extra_data: Some(Arc::new(|bag| {
            bag.as_any().downcast_ref::<TicketBag>().map_or(false, |bag| bag.allowed)
        })),
        ..Default::default()
    });
    unit.set_parent(Some(parent));
    let mut stream = ByteStream::new();
    let error = unit.read(&mut stream, None, false).unwrap_err();
    assert_eq!(error.violation(), Some(&RequirementViolation::ParentExtraDataRejected));
    assert_eq!(unit.read_calls.get(), 0);
}

const CHUNK_MAGIC: u32 = 0x4B4E_4843; // "CHNK"

/// A small real unit: magic, zero-terminated name, length-prefixed payload.
struct ChunkHeader {
    requirements: Arc<SerializationRequirements>,
    name:         String,
    payload:      Vec<u8>,
}

impl ChunkHeader {
    fn new(name: &str, payload: Vec<u8>) -> ChunkHeader {
        ChunkHeader {
            requirements: Arc::new(SerializationRequirements {
                read_needs_seek: true,
                write_needs_seek: true,
                ..Default::default()
            }),
            name: name.into(),
            payload,
        }
    }

    fn empty() -> ChunkHeader {
        ChunkHeader::new("", Vec::new())
    }
}

impl Serializable for ChunkHeader {
    fn type_label(&self) -> &'static str {
        short_type_name::<ChunkHeader>()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn parent(&self) -> &dyn Serializable {
        self
    }

    fn requirements(&self) -> Arc<dyn Requirements> {
        self.requirements.clone()
    }

    fn read_body(
        &mut self,
        stream: &mut dyn Stream,
        reader: Option<&mut ReusableReader>,
        _unfixed_len: bool,
    ) -> BodyResult<Option<UnitHandle>> {
        let mut owned;
        let reader = match reader {
            Some(reader) => reader,
            None => {
                owned = ReusableReader::bind(&*stream);
                &mut owned
            }
        };
        let magic = reader.read_u32(stream)?;
        if magic != CHUNK_MAGIC {
            return Err(format!("unexpected chunk magic {magic:#010x}").into());
        }
        self.name = reader.read_cstring(stream, 64)?;
        let len = reader.read_u32(stream)? as usize;
        self.payload = vec![0; len];
        reader.read_exact(stream, &mut self.payload)?;
        Ok(None)
    }

    fn write_body(
        &self,
        stream: &mut dyn Stream,
        writer: Option<&mut ReusableWriter>,
        _version_spec: Option<&dyn Serializable>,
        _unfixed_len: bool,
    ) -> BodyResult<()> {
        let mut owned;
        let writer = match writer {
            Some(writer) => writer,
            None => {
                owned = ReusableWriter::bind(&*stream);
                &mut owned
            }
        };
        writer.write_u32(stream, CHUNK_MAGIC)?;
        writer.write_cstring(stream, &self.name)?;
        writer.write_u32(stream, self.payload.len() as u32)?;
        writer.write_all(stream, &self.payload)?;
        Ok(())
    }

    fn read_magic(
        &self,
        stream: &mut dyn Stream,
        reader: Option<&mut ReusableReader>,
        _unfixed_len: bool,
    ) -> BodyResult<MagicValue> {
        let magic = match reader {
            Some(reader) => reader.read_u32(stream)?,
            None => ReusableReader::bind(&*stream).read_u32(stream)?,
        };
        Ok(MagicValue::U32(magic))
    }
}

#[test]
fn chunk_round_trips_through_the_contract() {
    let mut stream = ByteStream::new();
    let mut writer = ReusableWriter::bind(&stream);
    let chunk = ChunkHeader::new("terrain", vec![1, 2, 3, 4, 5]);
    chunk.write(&mut stream, Some(&mut writer), None, false).unwrap();

    stream.seek(SeekFrom::Start(0)).unwrap();
    let mut reader = ReusableReader::bind(&stream);
    let probe = ChunkHeader::empty();
    let matches = probe
        .check_magic(
            &|magic| magic == &MagicValue::U32(CHUNK_MAGIC),
            &mut stream,
            Some(&mut reader),
            false,
        )
        .unwrap();
    assert!(matches);

    stream.seek(SeekFrom::Start(0)).unwrap();
    let mut decoded = ChunkHeader::empty();
    let spec = decoded.read(&mut stream, Some(&mut reader), false).unwrap();
    assert!(spec.is_none());
    assert_eq!(decoded.name, "terrain");
    assert_eq!(decoded.payload, vec![1, 2, 3, 4, 5]);
}

#[test]
fn corrupt_magic_fails_the_read_body() {
    let mut stream = ByteStream::from_bytes(vec![0xDE, 0xAD, 0xBE, 0xEF]);
    let mut decoded = ChunkHeader::empty();
    let error = decoded.read(&mut stream, None, false).unwrap_err();
    assert_eq!(error.unit_type(), "ChunkHeader");
    assert!(!error.is_write());
    assert!(error.violation().is_none());
}

#[test]
fn errors_expose_the_serial_result_alias() {
    fn run(unit: &mut ProbeUnit, stream: &mut ByteStream) -> SerialResult<Option<UnitHandle>> {
        unit.read(stream, None, false)
    }
    let mut unit = ProbeUnit::unconstrained();
    let mut stream = ByteStream::new();
    let outcome: Result<_, SerializationError> = run(&mut unit, &mut stream);
    assert!(outcome.is_ok());
}
