//! Result-set decoding: column definitions followed by rows.

use mysql_codec::protocol::{Encoding, Geometry, Packet, PacketWriter, Point, charset, packets};
use mysql_codec::types::column_flags;
use mysql_codec::{CodecConfig, ColumnDef, FieldType, Timezone, Value, decode_binary_row};

fn column_packet(name: &str, field_type: FieldType, charset: u16, flags: u16) -> Vec<u8> {
    let mut writer = PacketWriter::new();
    for s in ["def", "app", "t", "t", name, name] {
        writer.write_length_coded_string(s, Encoding::Utf8);
    }
    writer.write_length_coded_number(0x0C);
    writer.write_u16_le(charset);
    writer.write_u32_le(0);
    writer.write_u8(field_type as u8);
    writer.write_u16_le(flags);
    writer.write_u8(0);
    writer.write_zeros(2);
    writer.finish(1).unwrap()
}

#[test]
fn test_binary_result_set_to_json() {
    let mut stream = Vec::new();
    let unsigned = column_flags::UNSIGNED;
    stream.extend(column_packet("id", FieldType::LongLong, charset::BINARY, unsigned));
    stream.extend(column_packet("name", FieldType::VarString, charset::UTF8MB4_GENERAL_CI, 0));
    stream.extend(column_packet("born", FieldType::Date, charset::BINARY, 0));
    stream.extend(column_packet("spot", FieldType::Geometry, charset::BINARY, 0));
    stream.extend(column_packet("note", FieldType::Blob, charset::UTF8MB4_GENERAL_CI, 0));

    let mut row = PacketWriter::new();
    row.write_u8(0x00);
    // Column 4 ("note") is NULL: bit 6.
    row.write_u8(0b0100_0000);
    row.write_u64_le(u64::MAX);
    row.write_length_coded_string("Zoë", Encoding::Utf8);
    row.write_bytes(&[4, 0xE8, 0x07, 2, 29]);
    row.write_geometry(0, &Geometry::Point(Point { x: 1.5, y: -2.0 }));
    stream.extend(row.finish(6).unwrap());

    let config = CodecConfig::new().timezone(Timezone::Utc);
    let mut iter = packets(&stream);
    let columns: Vec<ColumnDef> = iter
        .by_ref()
        .take(5)
        .map(|mut p| p.read_column_definition(config.encoding()).unwrap())
        .collect();
    assert_eq!(columns[1].name, "name");
    assert!(columns[0].is_unsigned());

    let mut row_packet: Packet<'_> = iter.next().unwrap();
    let values = decode_binary_row(&mut row_packet, &columns, &config).unwrap();
    assert_eq!(values[4], Value::Null);
    assert_eq!(values[1].as_str(), Some("Zoë"));

    let json = serde_json::to_value(&values).unwrap();
    assert_eq!(
        json,
        serde_json::json!([
            "18446744073709551615",
            "Zoë",
            "2024-02-29T00:00:00Z",
            {"x": 1.5, "y": -2.0},
            null,
        ])
    );
}
