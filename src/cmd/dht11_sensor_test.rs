use std::{thread, time::Duration};

use domo_hedgie::config::DHT11_PIN;
use domo_hedgie::io_pin_wapper::IoPinWapper;
use domo_hedgie::sensor::TempHumSensor;
use domo_hedgie::sensor::dht11::DHT11;
use domo_hedgie::std_clock::StdClock;
use rppal::gpio::Gpio;

/// DHT11传感器测试程序，可以传入BCM针脚编号
fn main() -> anyhow::Result<()> {
    let bcm = match std::env::args().nth(1) {
        Some(arg) => arg.parse()?,
        None => DHT11_PIN,
    };
    let gpio = Gpio::new()?;
    let mut dht11 = DHT11::new(IoPinWapper::open(&gpio, bcm)?, StdClock);

    loop {
        match dht11.read() {
            Ok(m) => println!(
                "✅ 温度: {:.1}°C, 湿度: {:.1}%",
                m.temperature_c, m.humidity_pct
            ),
            Err(e) => eprintln!("❌ 读取失败: {}", e),
        }

        // DHT11两次读取至少间隔1秒，这里留足余量
        thread::sleep(Duration::from_secs(2));
    }
}
