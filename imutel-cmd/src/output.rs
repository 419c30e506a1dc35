use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use imutel::packet::DecodedPacket;
use serde::Serialize;

const HEADERS: [&str; 7] = [
    "timestamp", "accX", "accY", "accZ", "gyroX", "gyroY", "gyroZ",
];

/// One CSV output row.
///
/// Only the first accelerometer and gyroscope sample of a packet is written;
/// a packet missing a sample gets empty fields rather than failing the run.
#[derive(Debug, Serialize)]
struct Row {
    timestamp: u32,
    acc_x: Option<f32>,
    acc_y: Option<f32>,
    acc_z: Option<f32>,
    gyro_x: Option<f32>,
    gyro_y: Option<f32>,
    gyro_z: Option<f32>,
}

impl From<&DecodedPacket> for Row {
    fn from(packet: &DecodedPacket) -> Self {
        let acc = packet.accel.first();
        let gyro = packet.gyro.first();
        Row {
            timestamp: packet.timestamp,
            acc_x: acc.map(|s| s.x),
            acc_y: acc.map(|s| s.y),
            acc_z: acc.map(|s| s.z),
            gyro_x: gyro.map(|s| s.x),
            gyro_y: gyro.map(|s| s.y),
            gyro_z: gyro.map(|s| s.z),
        }
    }
}

/// Append a .csv extension unless one is already present.
pub fn with_csv_extension(path: &Path) -> PathBuf {
    match path.extension() {
        Some(ext) if ext.eq_ignore_ascii_case("csv") => path.to_path_buf(),
        _ => {
            let mut s = path.as_os_str().to_os_string();
            s.push(".csv");
            PathBuf::from(s)
        }
    }
}

/// Write decoded packets as semicolon-delimited CSV, header row included.
pub fn write_csv<W: Write>(writer: W, packets: &[DecodedPacket]) -> Result<()> {
    let mut w = csv::WriterBuilder::new()
        .delimiter(b';')
        .has_headers(false)
        .from_writer(writer);

    w.write_record(HEADERS).context("writing header")?;
    for packet in packets {
        w.serialize(Row::from(packet)).context("writing record")?;
    }
    w.flush().context("flushing output")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use imutel::packet::SensorTriplet;

    fn packet(timestamp: u32, accel: Vec<SensorTriplet>, gyro: Vec<SensorTriplet>) -> DecodedPacket {
        DecodedPacket {
            timestamp,
            accel,
            gyro,
        }
    }

    #[test]
    fn writes_header_and_first_samples() {
        let packets = vec![packet(
            1,
            vec![
                SensorTriplet { x: 1.0, y: 2.0, z: 3.0 },
                SensorTriplet { x: 7.0, y: 8.0, z: 9.0 },
            ],
            vec![SensorTriplet { x: 4.0, y: 5.0, z: 6.0 }],
        )];

        let mut buf = Vec::new();
        write_csv(&mut buf, &packets).unwrap();

        let got = String::from_utf8(buf).unwrap();
        assert_eq!(
            got,
            "timestamp;accX;accY;accZ;gyroX;gyroY;gyroZ\n1;1.0;2.0;3.0;4.0;5.0;6.0\n"
        );
    }

    #[test]
    fn missing_samples_are_empty_fields() {
        let packets = vec![packet(7, vec![], vec![])];

        let mut buf = Vec::new();
        write_csv(&mut buf, &packets).unwrap();

        let got = String::from_utf8(buf).unwrap();
        assert_eq!(
            got,
            "timestamp;accX;accY;accZ;gyroX;gyroY;gyroZ\n7;;;;;;\n"
        );
    }

    #[test]
    fn header_is_written_for_empty_output() {
        let mut buf = Vec::new();
        write_csv(&mut buf, &[]).unwrap();

        let got = String::from_utf8(buf).unwrap();
        assert_eq!(got, "timestamp;accX;accY;accZ;gyroX;gyroY;gyroZ\n");
    }

    #[test]
    fn csv_extension_is_appended_when_missing() {
        assert_eq!(
            with_csv_extension(Path::new("out")),
            PathBuf::from("out.csv")
        );
        assert_eq!(
            with_csv_extension(Path::new("data/parsed.dat")),
            PathBuf::from("data/parsed.dat.csv")
        );
        assert_eq!(
            with_csv_extension(Path::new("out.csv")),
            PathBuf::from("out.csv")
        );
    }
}
